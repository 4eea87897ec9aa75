//! File storage for uploaded photos and generated documents.

use crate::error::{AppError, AppResult};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Where uploads, error workbooks and exports are kept. Keys are flat file
/// names; callers only ever see them through [`Storage::url`].
pub trait Storage: Send + Sync {
    /// Stores `bytes` under `name` and returns the key to read it back.
    fn save(&self, name: &str, bytes: &[u8]) -> AppResult<String>;
    fn read(&self, key: &str) -> AppResult<Vec<u8>>;
    fn delete(&self, key: &str) -> AppResult<()>;
    /// Relative URL under which the file is served.
    fn url(&self, key: &str) -> String;
}

/// A `<timestamp>-<uuid>.<ext>` key for an uploaded file, keeping the
/// original extension.
pub fn unique_name(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    format!(
        "{}-{}{}",
        Utc::now().format("%Y%m%d%H%M%S"),
        uuid::Uuid::new_v4(),
        ext
    )
}

pub struct LocalStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(LocalStorage {
            root,
            public_prefix: public_prefix.into(),
        })
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(AppError::BadRequest(format!("invalid file key '{key}'")));
        }
        Ok(self.root.join(key))
    }
}

impl Storage for LocalStorage {
    fn save(&self, name: &str, bytes: &[u8]) -> AppResult<String> {
        let path = self.path_for(name)?;
        fs::write(path, bytes)?;
        Ok(name.to_string())
    }

    fn read(&self, key: &str) -> AppResult<Vec<u8>> {
        let path = self.path_for(key)?;
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::not_found("file")),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::not_found("file")),
            Err(e) => Err(e.into()),
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.public_prefix, key)
    }
}
