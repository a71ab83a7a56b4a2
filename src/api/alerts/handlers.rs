use actix_web::{
    HttpResponse, Responder, get,
    web::{Data, ServiceConfig},
};
use chrono::SecondsFormat;
use tracing::info;

use super::dto::{StatusResponse, TriggerResponse};
use crate::worker::{CycleRunner, Trigger};

/// Seen-store size and time of the latest check
///
/// Never waits on a running cycle.
#[get("/status")]
async fn status(runner: Data<CycleRunner>) -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        ok: true,
        total_seen: runner.total_seen(),
        last_check: runner
            .last_check()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Run one cycle synchronously
///
/// Returns 409 when a cycle is already in progress.
#[get("/trigger")]
async fn trigger(runner: Data<CycleRunner>) -> impl Responder {
    info!("Manual trigger received");

    match runner.try_run(Trigger::Manual).await {
        Some(report) => HttpResponse::Ok().json(TriggerResponse {
            ok: true,
            sent: report.sent,
            error: None,
        }),
        None => HttpResponse::Conflict().json(TriggerResponse {
            ok: false,
            sent: 0,
            error: Some("cycle already in progress".to_string()),
        }),
    }
}

pub fn alerts_config(config: &mut ServiceConfig) {
    config.service(status).service(trigger);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SeenStore;
    use crate::jobs::fakes::{listing, FakeSource, RecordingNotifier};
    use crate::jobs::KeywordMatcher;
    use crate::worker::Pipeline;
    use actix_web::{App, http::StatusCode, test};
    use std::sync::Arc;
    use std::time::Duration;

    fn runner(source: FakeSource) -> Arc<CycleRunner> {
        Arc::new(CycleRunner::new(Pipeline::new(
            Arc::new(source),
            Arc::new(RecordingNotifier::default()),
            KeywordMatcher::new(["remote", "intern"]),
            SeenStore::in_memory(),
            Duration::ZERO,
        )))
    }

    fn two_listings() -> FakeSource {
        FakeSource::new(vec![
            listing(Some("J1"), "Remote Software Intern"),
            listing(Some("J2"), "Accountant"),
        ])
    }

    #[actix_web::test]
    async fn trigger_runs_a_cycle_and_status_reflects_it() {
        let runner = runner(two_listings());
        let app = test::init_service(
            App::new()
                .app_data(Data::from(runner.clone()))
                .configure(alerts_config),
        )
        .await;

        let req = test::TestRequest::get().uri("/trigger").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!({"ok": true, "sent": 1}));

        let req = test::TestRequest::get().uri("/trigger").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!({"ok": true, "sent": 0}));

        let req = test::TestRequest::get().uri("/status").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["total_seen"], 1);

        let last_check = body["last_check"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(last_check).is_ok());
    }

    #[actix_web::test]
    async fn trigger_during_running_cycle_is_rejected() {
        let runner = runner(two_listings().with_delay(Duration::from_millis(200)));
        let app = test::init_service(
            App::new()
                .app_data(Data::from(runner.clone()))
                .configure(alerts_config),
        )
        .await;

        let background = runner.clone();
        let running = actix_web::rt::spawn(async move { background.try_run(Trigger::Timer).await });
        actix_web::rt::time::sleep(Duration::from_millis(20)).await;

        let req = test::TestRequest::get().uri("/trigger").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["sent"], 0);

        // Status is served while the cycle is still running
        let req = test::TestRequest::get().uri("/status").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let report = running.await.unwrap().expect("timer cycle should have run");
        assert_eq!(report.sent, 1);
        assert_eq!(runner.total_seen(), 1);
    }
}
