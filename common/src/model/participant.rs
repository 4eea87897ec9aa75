use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle state of a participant record.
///
/// `NotDone` is the initial state. `PartialDone` means the aid was handed over
/// but the recipient photo is still missing, `Done` is the successful terminal
/// state. `Rejected` only survives on the soft-deleted original of a corrected
/// record; the correction itself is stored as a fresh `Done` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantStatus {
    #[serde(rename = "NOT DONE")]
    NotDone,
    #[serde(rename = "PARTIAL_DONE")]
    PartialDone,
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl ParticipantStatus {
    pub const ALL: [ParticipantStatus; 4] = [
        ParticipantStatus::NotDone,
        ParticipantStatus::PartialDone,
        ParticipantStatus::Done,
        ParticipantStatus::Rejected,
    ];

    /// Wire and storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotDone => "NOT DONE",
            Self::PartialDone => "PARTIAL_DONE",
            Self::Done => "DONE",
            Self::Rejected => "REJECTED",
        }
    }

    /// Exact match against the wire form. Transition targets go through this
    /// one: `"rejected"` is not `REJECTED`.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    /// Lenient parse used for filters and spreadsheet cells:
    /// surrounding whitespace and letter case are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown participant status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ParticipantStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// One address block. A participant carries two: the address printed on the
/// KTP (identity card) and the current residence (domisili).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub address: String,
    pub rt: String,
    pub rw: String,
    pub province: String,
    pub regency: String,
    pub district: String,
    pub village: String,
    pub postal_code: String,
}

impl Address {
    /// Copy with the region names upper-cased, the form in which region
    /// reference data is stored.
    pub fn with_uppercase_regions(&self) -> Address {
        Address {
            province: self.province.to_uppercase(),
            regency: self.regency.to_uppercase(),
            district: self.district.to_uppercase(),
            village: self.village.to_uppercase(),
            ..self.clone()
        }
    }
}

/// A program beneficiary ("penerima bantuan").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    pub nik: String,
    pub gender: String,
    pub phone: String,
    pub ktp: Address,
    pub residence: Address,
    pub status: ParticipantStatus,
    /// Relative path of the hand-over photo.
    pub image: String,
    /// Relative path of the recipient photo.
    pub image_penerima: String,
    pub is_represented: bool,
    pub has_printed: bool,
    /// Correlation token shared by every participant of one import batch.
    pub reference: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
