//! Region reference data, ordered by name.

use crate::error::AppError;
use crate::response::success;
use crate::state::AppState;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Scope};
use common::requests::RegionQuery;

const API_PATH: &str = "/region";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/province", get().to(provinces))
        .route("/regency", get().to(regencies))
        .route("/district", get().to(districts))
        .route("/village", get().to(villages))
}

/// Provinces whose name starts with `search` (all when blank).
async fn provinces(
    state: web::Data<AppState>,
    query: web::Query<RegionQuery>,
) -> Result<HttpResponse, AppError> {
    let search = query.into_inner().search;
    let rows = web::block(move || state.regions.provinces(&search)).await??;
    Ok(success(rows))
}

async fn regencies(
    state: web::Data<AppState>,
    query: web::Query<RegionQuery>,
) -> Result<HttpResponse, AppError> {
    let province_id = query.province_id;
    let rows = web::block(move || state.regions.regencies(province_id)).await??;
    Ok(success(rows))
}

async fn districts(
    state: web::Data<AppState>,
    query: web::Query<RegionQuery>,
) -> Result<HttpResponse, AppError> {
    let regency_id = query.regency_id;
    let rows = web::block(move || state.regions.districts(regency_id)).await??;
    Ok(success(rows))
}

async fn villages(
    state: web::Data<AppState>,
    query: web::Query<RegionQuery>,
) -> Result<HttpResponse, AppError> {
    let district_id = query.district_id;
    let rows = web::block(move || state.regions.villages(district_id)).await??;
    Ok(success(rows))
}
