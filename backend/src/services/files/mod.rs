//! Serving stored files: raw bytes under `image/{key}`, or a base64
//! `data:` URL under `photobase64/{key}`.

use crate::error::AppError;
use crate::response::success;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mime_guess::from_path;

async fn read(state: web::Data<AppState>, key: String) -> Result<Vec<u8>, AppError> {
    Ok(web::block(move || state.storage.read(&key)).await??)
}

pub(crate) async fn image(
    state: web::Data<AppState>,
    key: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let key = key.into_inner();
    let mime = from_path(&key).first_or_octet_stream();
    let bytes = read(state, key).await?;
    Ok(HttpResponse::Ok().content_type(mime.as_ref()).body(bytes))
}

pub(crate) async fn photo_base64(
    state: web::Data<AppState>,
    key: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let key = key.into_inner();
    let mime = from_path(&key).first_or_octet_stream();
    let bytes = read(state, key).await?;
    Ok(success(format!(
        "data:{};base64,{}",
        mime.as_ref(),
        STANDARD.encode(bytes)
    )))
}
