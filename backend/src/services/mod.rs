//! HTTP layer. Each area exposes `configure_routes()`; everything is mounted
//! under `/api/v1`. Handlers parse the request, run the domain call on the
//! blocking pool and wrap the result in the JSON envelope.

use actix_web::web::{get, post, scope};
use actix_web::{HttpResponse, Responder, Scope};

mod dashboard;
mod export;
mod files;
mod form;
mod jobs;
mod participants;
mod regions;
mod report;
mod users;

const API_PATH: &str = "/api/v1";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/ping", get().to(ping))
        .route("/login", post().to(users::login::process))
        .route("/register", post().to(users::register::process))
        .route("/image/{key}", get().to(files::image))
        .route("/photobase64/{key}", get().to(files::photo_base64))
        .route("/jobs/{job_id}", get().to(jobs::process))
        .service(users::configure_routes())
        .service(participants::configure_routes())
        .service(dashboard::configure_routes())
        .service(export::configure_routes())
        .service(report::configure_routes())
        .service(regions::configure_routes())
}

async fn ping() -> impl Responder {
    HttpResponse::Ok().json(crate::response::ApiResponse::<()>::message(
        actix_web::http::StatusCode::OK,
        "pong",
    ))
}

#[cfg(test)]
pub(crate) mod test_support;
