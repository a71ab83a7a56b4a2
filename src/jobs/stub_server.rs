//! Local HTTP endpoint standing in for the provider and Telegram in tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};

/// One request as the stub received it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    /// Header names are lowercase
    pub headers: HashMap<String, String>,
    pub body: String,
}

struct Reply {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// Answers every request with the same canned reply
pub struct StubServer {
    base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    handle: ServerHandle,
}

impl StubServer {
    /// Bind a random local port and start serving
    pub async fn start(status: u16, body: &'static str) -> StubServer {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    /// Like `start`, but each reply is held back for `delay`
    pub async fn start_with_delay(status: u16, body: &'static str, delay: Duration) -> StubServer {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let reply = web::Data::new(Reply {
            status: StatusCode::from_u16(status).expect("valid status code"),
            body,
            delay,
            requests: requests.clone(),
        });

        let server = HttpServer::new(move || {
            App::new()
                .app_data(reply.clone())
                .default_service(web::to(respond))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind stub server");

        let port = server.addrs()[0].port();
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        StubServer {
            base_url: format!("http://127.0.0.1:{}", port),
            requests,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn respond(req: HttpRequest, body: web::Bytes, reply: web::Data<Reply>) -> HttpResponse {
    let query = web::Query::<HashMap<String, String>>::from_query(req.query_string())
        .map(|q| q.into_inner())
        .unwrap_or_default();
    let headers = req
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    reply.requests.lock().unwrap().push(Recorded {
        method: req.method().to_string(),
        path: req.path().to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    HttpResponse::build(reply.status)
        .content_type("application/json")
        .body(reply.body)
}
