//! Payloads accepted by the HTTP API. Every field defaults so partially
//! filled forms and query strings bind without errors; blank strings mean
//! "not provided".

use crate::model::participant::Address;
use serde::{Deserialize, Serialize};

/// Body of both the status transition and the edit endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateParticipant {
    pub name: String,
    pub nik: String,
    pub gender: String,
    pub phone: String,
    pub ktp: Address,
    pub residence: Address,
    /// Target status. Blank or unknown values make a transition a no-op.
    pub status: String,
    pub image: String,
    pub image_penerima: String,
    pub updated_by: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Paged participant listing, filtered on the KTP address block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParticipantQuery {
    pub search: String,
    pub page: u32,
    pub size: u32,
    pub province: String,
    pub regency: String,
    pub district: String,
    pub village: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Dashboard and export filter, applied to the residence address block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardQuery {
    pub province: String,
    pub regency: String,
    pub district: String,
    pub village: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// `YYYY-MM-DD`; restricts counts to rows updated on that day.
    pub date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    pub province: String,
    pub regency: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    /// `PRINTED`, `NOT PRINTED` or blank for both.
    pub has_printed: String,
    pub time_note: String,
    pub evaluation: String,
    pub solution: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PagedQuery {
    pub search: String,
    pub page: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegionQuery {
    pub province_id: i64,
    pub regency_id: i64,
    pub district_id: i64,
    pub search: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub organization_id: i64,
    pub province: String,
    pub regency: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: String,
    pub role: String,
    /// Blank keeps the current password.
    pub password: String,
    pub retry_attempts: Option<i64>,
}
