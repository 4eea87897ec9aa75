//! Account endpoints.
//!
//! - `POST /login`, `POST /register` are mounted at the API root.
//! - `/user` lists, creates (as `ADMIN-EO`), reads, updates and soft
//!   deletes accounts.
//! - `/user/organization` lists the organizations accounts belong to. It is
//!   registered before `/{id}` so it is not taken for an id.

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

pub(super) mod login;
mod manage;
pub(super) mod register;

const API_PATH: &str = "/user";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(manage::list))
        .route("", post().to(manage::create))
        .route("/organization", get().to(manage::organizations))
        .route("/{id}", get().to(manage::get_one))
        .route("/{id}", put().to(manage::update))
        .route("/{id}", delete().to(manage::remove))
}
