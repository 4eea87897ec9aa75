use serde::{Deserialize, Serialize};

/// Capacity ceiling for one province/regency and program type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub id: i64,
    pub total: i64,
    pub province: String,
    pub regency: String,
    #[serde(rename = "type")]
    pub kind: String,
}
