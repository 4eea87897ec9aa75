//! Downloadable data exports. Both answer with the URL of a file that is
//! removed again after the configured TTL.

use crate::error::AppError;
use crate::response::success;
use crate::state::AppState;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Scope};
use common::requests::DashboardQuery;

const API_PATH: &str = "/export";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/excel", get().to(excel))
        .route("/csv", get().to(csv))
}

async fn excel(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let url = web::block(move || state.exporter.data_workbook(&query)).await??;
    Ok(success(url))
}

async fn csv(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let url = web::block(move || state.exporter.data_csv(&query)).await??;
    Ok(success(url))
}

#[cfg(test)]
mod tests {
    use crate::job_controller::queue::BackgroundTask;
    use crate::services::test_support::{test_app, TestContext};
    use crate::storage::Storage;
    use crate::store::fixtures::new_participant;
    use crate::store::ParticipantStore;
    use actix_web::test;
    use serde_json::Value;
    use std::time::Duration;

    #[actix_web::test]
    async fn csv_export_keeps_nik_textual() {
        let mut ctx = TestContext::new();
        ctx.db.create(&new_participant("3201010101010001")).unwrap();
        let app = test_app!(ctx);

        let req = test::TestRequest::get().uri("/api/v1/export/csv").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let url = body["data"].as_str().unwrap();
        let key = url.strip_prefix("image/").unwrap();
        let text = String::from_utf8(ctx.state.storage.read(key).unwrap()).unwrap();
        assert!(text.contains("'3201010101010001"));

        match ctx.tasks.try_recv().unwrap() {
            BackgroundTask::ExpireFile { key: expiring, after } => {
                assert_eq!(expiring, key);
                assert_eq!(after, Duration::from_secs(30));
            }
            other => panic!("unexpected task {other:?}"),
        }
    }

    #[actix_web::test]
    async fn excel_export_returns_a_workbook_url() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);
        let req = test::TestRequest::get()
            .uri("/api/v1/export/excel?status=DONE")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["data"].as_str().unwrap().ends_with(".xlsx"));
    }
}
