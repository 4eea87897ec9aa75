//! Buffers a multipart request into named text fields and files.

use crate::error::{AppError, AppResult};
use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::collections::HashMap;

pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct FormParts {
    fields: HashMap<String, Vec<u8>>,
    files: HashMap<String, UploadedFile>,
}

impl FormParts {
    pub async fn collect(mut payload: Multipart) -> AppResult<Self> {
        let mut parts = FormParts::default();
        while let Some(item) = payload.next().await {
            let mut field = item.map_err(|e| AppError::BadRequest(e.to_string()))?;
            let (name, file_name) = match field.content_disposition() {
                Some(cd) => (
                    cd.get_name().map(str::to_string),
                    cd.get_filename().map(str::to_string),
                ),
                None => (None, None),
            };
            let Some(name) = name else { continue };

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
                bytes.extend_from_slice(&chunk);
            }

            match file_name {
                Some(file_name) if !file_name.is_empty() => {
                    parts.files.insert(name, UploadedFile { file_name, bytes });
                }
                _ => {
                    parts.fields.insert(name, bytes);
                }
            }
        }
        Ok(parts)
    }

    /// Text field, empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .unwrap_or_default()
    }

    pub fn raw(&self, name: &str) -> Option<&[u8]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name).filter(|f| !f.bytes.is_empty())
    }
}
