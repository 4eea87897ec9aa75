//! Write-side shapes handed to the stores.

use common::model::import_log::ImportStatus;
use common::model::participant::{Address, ParticipantStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct NewParticipant {
    pub name: String,
    pub nik: String,
    pub gender: String,
    pub phone: String,
    pub ktp: Address,
    pub residence: Address,
    pub status: ParticipantStatus,
    pub image: String,
    pub image_penerima: String,
    pub is_represented: bool,
    pub reference: String,
    pub kind: String,
    pub updated_by: String,
}

/// In-place status change. `None` images keep the stored path.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: ParticipantStatus,
    pub image: Option<String>,
    pub image_penerima: Option<String>,
    pub updated_by: String,
}

/// Full replacement of the editable fields of a participant.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantEdit {
    pub name: String,
    pub nik: String,
    pub gender: String,
    pub phone: String,
    pub ktp: Address,
    pub residence: Address,
    pub status: ParticipantStatus,
    pub image: String,
    pub image_penerima: String,
    pub kind: String,
    pub updated_by: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewImportLog {
    pub file_name: String,
    pub status: ImportStatus,
    pub total_rows: u32,
    pub success_rows: u32,
    pub failed_rows: u32,
    pub path: Option<String>,
    pub reference: Option<String>,
    pub uploaded_by: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub organization_id: i64,
    pub province: String,
    pub regency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    pub name: String,
    pub role: String,
    /// New hash, or `None` to keep the current password.
    pub password_hash: Option<String>,
    pub retry_attempts: i64,
}
