//! Status counters over the residence address.
//!
//! - `GET /dashboard` totals for the filter, with the remaining quota.
//! - `GET /dashboard/region` the same counters per province and regency.
//! - `GET /dashboard/excel` those rows as a workbook.

use crate::error::AppError;
use crate::response::success;
use crate::state::AppState;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Scope};
use common::requests::DashboardQuery;

const API_PATH: &str = "/dashboard";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(totals))
        .route("/region", get().to(by_region))
        .route("/excel", get().to(workbook))
}

async fn totals(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let totals = web::block(move || state.dashboard.totals(&query)).await??;
    Ok(success(totals))
}

async fn by_region(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let regions = web::block(move || state.dashboard.by_region(&query)).await??;
    Ok(success(regions))
}

async fn workbook(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let url = web::block(move || state.exporter.dashboard_workbook(&query)).await??;
    Ok(success(url))
}

#[cfg(test)]
mod tests {
    use crate::services::test_support::{test_app, TestContext};
    use crate::store::fixtures::{new_participant, seed_quota};
    use crate::store::ParticipantStore;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use common::model::participant::ParticipantStatus;
    use serde_json::Value;

    #[actix_web::test]
    async fn totals_include_remaining_quota() {
        let ctx = TestContext::new();
        seed_quota(&ctx.db, "JAWA BARAT", "KOTA BANDUNG", "REGULER", 5);
        let mut done = new_participant("3201010101010001");
        done.status = ParticipantStatus::Done;
        ctx.db.create(&done).unwrap();
        ctx.db.create(&new_participant("3201010101010002")).unwrap();
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri("/api/v1/dashboard?province=JAWA%20BARAT&regency=KOTA%20BANDUNG&type=REGULER")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["done"], 1);
        assert_eq!(body["data"]["remaining_quota"], 4);
    }

    #[actix_web::test]
    async fn region_rows_follow_residence() {
        let ctx = TestContext::new();
        let mut bogor = new_participant("3201010101010001");
        bogor.residence.regency = "KOTA BOGOR".into();
        ctx.db.create(&bogor).unwrap();
        ctx.db.create(&new_participant("3201010101010002")).unwrap();
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri("/api/v1/dashboard/region")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["regency"], "KOTA BOGOR");
        assert_eq!(rows[1]["totals"]["not_done"], 1);
    }

    #[actix_web::test]
    async fn bad_date_is_rejected() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);
        let req = test::TestRequest::get()
            .uri("/api/v1/dashboard?date=17-08-2025")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn workbook_is_published_and_scheduled_for_expiry() {
        let mut ctx = TestContext::new();
        ctx.db.create(&new_participant("3201010101010001")).unwrap();
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri("/api/v1/dashboard/excel")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let url = body["data"].as_str().unwrap();
        assert!(url.starts_with("image/") && url.ends_with(".xlsx"));
        assert!(ctx.tasks.try_recv().is_ok());
    }
}
