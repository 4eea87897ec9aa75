use crate::error::AppError;
use crate::response::{paged, success};
use crate::state::AppState;
use crate::store::Page;
use actix_web::{web, HttpResponse};
use common::requests::{PagedQuery, RegisterRequest, UpdateUserRequest};

/// `GET /user`: paged accounts, optionally filtered by a name `search`.
pub(crate) async fn list(
    state: web::Data<AppState>,
    query: web::Query<PagedQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let page = Page::new(query.page, query.size);
    let search = query.search.clone();
    let (users, total) = web::block(move || state.accounts.list(&search, page)).await??;
    Ok(paged(users, query.page, query.size, total))
}

/// `POST /user`: creates an `ADMIN-EO` account.
pub(crate) async fn create(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let user = web::block(move || state.accounts.create(&request)).await??;
    Ok(success(user))
}

/// `GET /user/organization`: every organization an account can belong to.
pub(crate) async fn organizations(
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let organizations = web::block(move || state.accounts.organizations()).await??;
    Ok(success(organizations))
}

pub(crate) async fn get_one(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let user = web::block(move || state.accounts.get(id)).await??;
    Ok(success(user))
}

/// `PUT /user/{id}`: blank fields keep their stored values. Sending
/// `retry_attempts: 0` unlocks an account.
pub(crate) async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let (id, request) = (id.into_inner(), body.into_inner());
    let user = web::block(move || state.accounts.update(id, &request)).await??;
    Ok(success(user))
}

/// `DELETE /user/{id}`: soft delete. The username becomes free again.
pub(crate) async fn remove(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    web::block(move || state.accounts.delete(id)).await??;
    Ok(success("deleted"))
}
