use crate::error::AppError;
use crate::response::success;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::LoginRequest;

/// `POST /login`: checks the password and answers with a signed token and
/// the account.
///
/// Failures are 404 for an unknown username, 401 for a wrong password and
/// 429 once the account is locked.
pub(crate) async fn process(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let session = web::block(move || state.accounts.login(&request)).await??;
    Ok(success(session))
}
