use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;

/// Liveness response
#[derive(Serialize)]
struct LiveResponse {
    status: &'static str,
}

/// Readiness text
#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Job Alert Bot is running. Use /status or /trigger")
}

/// Liveness check endpoint
///
/// Simple check that the process is alive. Does not touch the pipeline.
#[get("/live")]
async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(LiveResponse { status: "alive" })
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config.service(index).service(liveness_check);
}
