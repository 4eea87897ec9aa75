use crate::error::AppError;
use crate::response::success;
use crate::services::form::{FormParts, UploadedFile};
use crate::state::AppState;
use crate::storage::{unique_name, Storage};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::participant::ParticipantStatus;
use common::requests::UpdateParticipant;
use log::warn;

/// Saves the uploaded photos and points the request at them. Every saved key
/// is pushed to `saved`, also when a later save fails.
fn attach_photos(
    storage: &dyn Storage,
    request: &mut UpdateParticipant,
    photo: Option<UploadedFile>,
    recipient_photo: Option<UploadedFile>,
    saved: &mut Vec<String>,
) -> Result<(), AppError> {
    if let Some(file) = photo {
        let key = storage.save(&unique_name(&file.file_name), &file.bytes)?;
        request.image = storage.url(&key);
        saved.push(key);
    }
    if let Some(file) = recipient_photo {
        let key = storage.save(&unique_name(&file.file_name), &file.bytes)?;
        request.image_penerima = storage.url(&key);
        saved.push(key);
    }
    Ok(())
}

fn discard_photos(storage: &dyn Storage, saved: &[String]) {
    for key in saved {
        if let Err(e) = storage.delete(key) {
            warn!("Could not remove unused photo {key}: {e}");
        }
    }
}

/// `PUT /participant/{id}`: multipart with a `json` part and optional
/// `file` / `file_penerima` photos.
///
/// Photos are only kept for `DONE` and `REJECTED`, the targets that record
/// them, and are removed again when the transition fails.
pub(crate) async fn process(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let mut form = FormParts::collect(payload).await?;
    let mut request: UpdateParticipant = match form.raw("json") {
        Some(json) => serde_json::from_slice(json)
            .map_err(|e| AppError::BadRequest(format!("invalid json part: {e}")))?,
        None => return Err(AppError::BadRequest("missing json part".to_string())),
    };
    let records_photos = matches!(
        ParticipantStatus::from_wire(&request.status),
        Some(ParticipantStatus::Done | ParticipantStatus::Rejected)
    );
    let (photo, recipient_photo) = if records_photos {
        (form.take_file("file"), form.take_file("file_penerima"))
    } else {
        (None, None)
    };

    let participant = web::block(move || {
        let storage = state.storage.as_ref();
        let mut saved = Vec::new();
        let outcome = attach_photos(storage, &mut request, photo, recipient_photo, &mut saved)
            .and_then(|()| state.transitions.transition(id, &request));
        if outcome.is_err() {
            discard_photos(storage, &saved);
        }
        outcome
    })
    .await??;
    Ok(success(participant))
}

pub(crate) async fn edit(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<UpdateParticipant>,
) -> Result<HttpResponse, AppError> {
    let (id, request) = (id.into_inner(), body.into_inner());
    let participant = web::block(move || state.transitions.edit(id, &request)).await??;
    Ok(success(participant))
}

pub(crate) async fn reset(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let participant = web::block(move || state.transitions.reset(id)).await??;
    Ok(success(participant))
}

pub(crate) async fn remove(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    web::block(move || state.transitions.delete(id)).await??;
    Ok(success("deleted"))
}

pub(crate) async fn cleanup_duplicates(
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let purged = web::block(move || state.transitions.cleanup_duplicates()).await??;
    Ok(success(purged))
}

#[cfg(test)]
mod tests {
    use crate::services::test_support::{test_app, MultipartBody, TestContext};
    use crate::storage::Storage;
    use crate::store::fixtures::{address, new_participant};
    use crate::store::ParticipantStore;
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn done_with_photos_stores_them() {
        let ctx = TestContext::new();
        let p = ctx.db.create(&new_participant("3201010101010001")).unwrap();
        let app = test_app!(ctx);

        let (content_type, body) = MultipartBody::new()
            .text("json", &json!({"status": "DONE", "updated_by": "petugas"}).to_string())
            .file("file", "serah.JPG", b"jpeg-bytes")
            .file("file_penerima", "penerima.png", b"png-bytes")
            .finish();
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/participant/{}", p.id))
            .insert_header((CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["status"], "DONE");
        let image = body["data"]["image"].as_str().unwrap();
        assert!(image.starts_with("image/") && image.ends_with(".jpg"));
        let key = image.strip_prefix("image/").unwrap();
        assert_eq!(ctx.state.storage.read(key).unwrap(), b"jpeg-bytes");
        assert!(body["data"]["image_penerima"]
            .as_str()
            .unwrap()
            .ends_with(".png"));
    }

    #[actix_web::test]
    async fn rejected_replaces_the_row() {
        let ctx = TestContext::new();
        let p = ctx.db.create(&new_participant("3201010101010001")).unwrap();
        let app = test_app!(ctx);

        let submitted = json!({
            "status": "REJECTED",
            "name": "SITI AMINAH",
            "nik": "3201010101010009",
            "gender": "P",
            "phone": "081234567890",
            "ktp": address(),
            "residence": address(),
            "updated_by": "petugas",
        });
        let (content_type, body) = MultipartBody::new()
            .text("json", &submitted.to_string())
            .finish();
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/participant/{}", p.id))
            .insert_header((CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_ne!(body["data"]["id"], p.id);
        assert_eq!(body["data"]["status"], "DONE");
        assert_eq!(body["data"]["type"], "REGULER");
        assert!(ctx.db.find_by_id(p.id).unwrap().is_none());
    }

    fn photo_upload(status: &str, nik: &str) -> (String, Vec<u8>) {
        let submitted = json!({
            "status": status,
            "name": "SITI AMINAH",
            "nik": nik,
            "gender": "P",
            "ktp": address(),
            "residence": address(),
        });
        MultipartBody::new()
            .text("json", &submitted.to_string())
            .file("file", "serah.jpg", b"jpeg-bytes")
            .file("file_penerima", "penerima.jpg", b"jpeg-bytes")
            .finish()
    }

    #[actix_web::test]
    async fn photos_for_missing_participant_are_removed() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);

        let (content_type, body) = photo_upload("DONE", "3201010101010001");
        let req = test::TestRequest::put()
            .uri("/api/v1/participant/404")
            .insert_header((CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ctx.stored_files(), 0);
    }

    #[actix_web::test]
    async fn photos_for_conflicting_rejection_are_removed() {
        let ctx = TestContext::new();
        let p = ctx.db.create(&new_participant("3201010101010001")).unwrap();
        ctx.db.create(&new_participant("3201010101010002")).unwrap();
        let app = test_app!(ctx);

        let (content_type, body) = photo_upload("REJECTED", "3201010101010002");
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/participant/{}", p.id))
            .insert_header((CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ctx.stored_files(), 0);
    }

    #[actix_web::test]
    async fn photos_are_not_stored_for_partial_done() {
        let ctx = TestContext::new();
        let p = ctx.db.create(&new_participant("3201010101010001")).unwrap();
        let app = test_app!(ctx);

        for status in ["PARTIAL_DONE", "NOT DONE", "done"] {
            let (content_type, body) = photo_upload(status, "3201010101010001");
            let req = test::TestRequest::put()
                .uri(&format!("/api/v1/participant/{}", p.id))
                .insert_header((CONTENT_TYPE, content_type))
                .set_payload(body)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
        assert_eq!(ctx.stored_files(), 0);
    }

    #[actix_web::test]
    async fn missing_json_part_is_bad_request() {
        let ctx = TestContext::new();
        let p = ctx.db.create(&new_participant("3201010101010001")).unwrap();
        let app = test_app!(ctx);
        let (content_type, body) = MultipartBody::new().text("other", "x").finish();
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/participant/{}", p.id))
            .insert_header((CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn edit_rejects_a_nik_in_use() {
        let ctx = TestContext::new();
        let p = ctx.db.create(&new_participant("3201010101010001")).unwrap();
        ctx.db.create(&new_participant("3201010101010002")).unwrap();
        let app = test_app!(ctx);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/participant/edit/{}", p.id))
            .set_json(json!({"name": "SITI", "nik": "3201010101010002"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "NIK sudah terdaftar");
    }

    #[actix_web::test]
    async fn reset_delete_and_duplicates() {
        let ctx = TestContext::new();
        let mut done = new_participant("3201010101010001");
        done.status = common::model::participant::ParticipantStatus::Done;
        let p = ctx.db.create(&done).unwrap();
        let app = test_app!(ctx);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/participant/reset/{}", p.id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], "NOT DONE");

        let req = test::TestRequest::delete()
            .uri("/api/v1/participant/duplicates")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], 0);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/participant/{}", p.id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert!(ctx.db.find_by_id(p.id).unwrap().is_none());
    }
}
