use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one import, derived purely from the row counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportStatus {
    #[serde(rename = "Success All")]
    SuccessAll,
    #[serde(rename = "Success With error")]
    SuccessWithError,
    #[serde(rename = "Error All")]
    ErrorAll,
}

impl ImportStatus {
    pub fn from_counts(success_rows: u32, failed_rows: u32) -> Self {
        if failed_rows > 0 && success_rows == 0 {
            ImportStatus::ErrorAll
        } else if failed_rows > 0 {
            ImportStatus::SuccessWithError
        } else {
            ImportStatus::SuccessAll
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuccessAll => "Success All",
            Self::SuccessWithError => "Success With error",
            Self::ErrorAll => "Error All",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [Self::SuccessAll, Self::SuccessWithError, Self::ErrorAll]
            .into_iter()
            .find(|status| status.as_str() == value)
    }
}

/// One record per bulk-import invocation. Never mutated after creation.
///
/// Callers inspect `failed_rows` and `path` to learn about rejected rows; an
/// import with failures is still a successful call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportLog {
    pub id: i64,
    pub file_name: String,
    pub status: ImportStatus,
    pub total_rows: u32,
    pub success_rows: u32,
    pub failed_rows: u32,
    /// URL of the annotated error workbook, present when any row failed.
    pub path: Option<String>,
    /// Batch token of the created participants, present when any row succeeded.
    pub reference: Option<String>,
    pub uploaded_by: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}
