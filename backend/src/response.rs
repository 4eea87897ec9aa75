//! The JSON envelope every endpoint answers with.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        ApiResponse {
            status: status.as_u16().to_string(),
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: i64,
}

/// `200` with `data`.
pub fn success<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse {
        status: StatusCode::OK.as_u16().to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}

pub fn paged<T: Serialize>(data: Vec<T>, page: u32, size: u32, total: i64) -> HttpResponse {
    HttpResponse::Ok().json(PagedResponse {
        status: StatusCode::OK.as_u16().to_string(),
        message: "Success".to_string(),
        data,
        page,
        size,
        total,
    })
}
