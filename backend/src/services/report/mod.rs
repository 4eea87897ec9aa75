//! `POST /report/export` renders the printable hand-over report.

use crate::error::AppError;
use crate::response::success;
use crate::state::AppState;
use actix_web::web::{post, scope};
use actix_web::{web, HttpResponse, Scope};
use common::requests::ReportRequest;

const API_PATH: &str = "/report";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/export", post().to(process))
}

async fn process(
    state: web::Data<AppState>,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let report = web::block(move || state.reports.export(&request)).await??;
    Ok(success(report))
}

#[cfg(test)]
mod tests {
    use crate::job_controller::queue::BackgroundTask;
    use crate::services::test_support::{test_app, TestContext};
    use crate::store::fixtures::new_participant;
    use crate::store::ParticipantStore;
    use actix_web::test;
    use common::model::participant::ParticipantStatus;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn report_queues_print_bookkeeping() {
        let mut ctx = TestContext::new();
        let mut done = new_participant("3201010101010001");
        done.status = ParticipantStatus::Done;
        let p = ctx.db.create(&done).unwrap();
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/api/v1/report/export")
            .set_json(json!({"has_printed": "NOT PRINTED", "type": "REGULER"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["files"].as_array().unwrap().len(), 1);
        let job_id = body["data"]["print_jobs"][0].as_str().unwrap().to_string();

        match ctx.tasks.try_recv().unwrap() {
            BackgroundTask::MarkPrinted { job_id: queued, ids } => {
                assert_eq!(queued, job_id);
                assert_eq!(ids, vec![p.id]);
            }
            other => panic!("unexpected task {other:?}"),
        }
    }
}
