//! Read side of the participant area.
//!
//! Both handlers run their store calls on actix's blocking pool through
//! `web::block`, since the SQLite connection is synchronous.

use crate::error::AppError;
use crate::response::{paged, success};
use crate::state::AppState;
use crate::store::{Page, ParticipantFilter};
use actix_web::{web, HttpResponse};
use common::requests::ParticipantQuery;

/// `GET /participant`: a page of participants plus the total match count.
///
/// Query parameters map onto [`ParticipantFilter`] (KTP region, status, type
/// and a name prefix `search`). `page`/`size` of 0 return every match.
pub(crate) async fn list(
    state: web::Data<AppState>,
    query: web::Query<ParticipantQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let filter = ParticipantFilter::from_query(&query);
    let page = Page::new(query.page, query.size);
    let (rows, total) = web::block(move || {
        let rows = state.participants.list(&filter, page)?;
        let total = state.participants.count(&filter)?;
        Ok::<_, AppError>((rows, total))
    })
    .await??;
    Ok(paged(rows, query.page, query.size, total))
}

/// `GET /participant/{id}`. Soft-deleted rows are 404.
pub(crate) async fn get_one(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let participant = web::block(move || state.transitions.get(id)).await??;
    Ok(success(participant))
}

#[cfg(test)]
mod tests {
    use crate::services::test_support::{test_app, TestContext};
    use crate::store::fixtures::new_participant;
    use crate::store::ParticipantStore;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    #[actix_web::test]
    async fn lists_with_paging_and_search() {
        let ctx = TestContext::new();
        for (i, name) in ["SITI", "SITI AMINAH", "BUDI"].into_iter().enumerate() {
            let mut p = new_participant(&format!("320101010101000{i}"));
            p.name = name.to_string();
            ctx.db.create(&p).unwrap();
        }
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri("/api/v1/participant?search=SITI&page=1&size=1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["page"], 1);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn missing_participant_is_404() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);
        let req = test::TestRequest::get()
            .uri("/api/v1/participant/42")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "404");
    }
}
