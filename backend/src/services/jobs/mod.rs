use crate::job_controller::state::JobsState;
use crate::response::success;
use actix_web::{web, HttpResponse, Responder};

/// Latest status of a background job.
pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    get_job_status(job_id, state).await
}

async fn get_job_status(job_id: web::Path<String>, state: web::Data<JobsState>) -> HttpResponse {
    match state.status(&job_id.into_inner()).await {
        Some(status) => success(status),
        None => HttpResponse::NotFound().json(crate::response::ApiResponse::<()>::message(
            actix_web::http::StatusCode::NOT_FOUND,
            "Job ID not found",
        )),
    }
}
