//! Participant endpoints under `/participant`.
//!
//! - `GET ""` paged listing filtered on the KTP address, `GET /{id}` one row.
//! - `PUT /{id}` status transition. Multipart: a `json` part with the
//!   submitted values plus optional `file` (hand-over photo) and
//!   `file_penerima` (recipient photo).
//! - `PUT /edit/{id}` corrects fields, `PUT /reset/{id}` returns the row to
//!   `NOT DONE`, `DELETE /{id}` soft deletes it.
//! - `DELETE /duplicates` purges rejected originals that were replaced.
//! - `POST /import` bulk import (multipart `file`, `type`, `uploaded_by`),
//!   `GET /import` the import history.

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

mod import;
mod list;
mod transition;

const API_PATH: &str = "/participant";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::list))
        // Literal segments first so they are not taken for an id.
        .route("/import", get().to(import::logs))
        .route("/import", post().to(import::upload))
        .route("/duplicates", delete().to(transition::cleanup_duplicates))
        .route("/edit/{id}", put().to(transition::edit))
        .route("/reset/{id}", put().to(transition::reset))
        .route("/{id}", get().to(list::get_one))
        .route("/{id}", put().to(transition::process))
        .route("/{id}", delete().to(transition::remove))
}
