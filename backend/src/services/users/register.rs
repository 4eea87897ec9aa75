use crate::error::AppError;
use crate::response::success;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::RegisterRequest;

/// `POST /register`: self-registration, always as `STAFF-LAPANGAN`.
pub(crate) async fn process(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let user = web::block(move || state.accounts.register(&request)).await??;
    Ok(success(user))
}
