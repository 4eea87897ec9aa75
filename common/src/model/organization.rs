use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event organizer or foundation an account belongs to. Users point at one
/// through `organization_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
