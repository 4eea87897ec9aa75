use crate::domain::import::ImportRequest;
use crate::error::AppError;
use crate::response::{paged, success};
use crate::services::form::FormParts;
use crate::state::AppState;
use crate::store::Page;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::requests::PagedQuery;

/// Runs a bulk import and answers with its log, including the error
/// workbook path when rows were rejected.
pub(crate) async fn upload(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let mut form = FormParts::collect(payload).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::BadRequest("missing file".to_string()))?;
    let request = ImportRequest {
        file_name: file.file_name,
        bytes: file.bytes,
        uploaded_by: form.text("uploaded_by"),
        kind: form.text("type"),
    };
    let log = web::block(move || state.importer.run(&request)).await??;
    Ok(success(log))
}

/// `GET /participant/import`: import history, newest first, searchable by
/// file name.
pub(crate) async fn logs(
    state: web::Data<AppState>,
    query: web::Query<PagedQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let page = Page::new(query.page, query.size);
    let search = query.search.clone();
    let (rows, total) = web::block(move || {
        let rows = state.import_logs.list(&search, page)?;
        let total = state.import_logs.count(&search)?;
        Ok::<_, AppError>((rows, total))
    })
    .await??;
    Ok(paged(rows, query.page, query.size, total))
}
