use serde::{Deserialize, Serialize};

/// Per-status counters shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub total: i64,
    pub done: i64,
    pub partial_done: i64,
    pub not_done: i64,
    pub rejected: i64,
    /// Quota left after subtracting `done`; zero when no quota is configured.
    pub remaining_quota: i64,
}

/// Status counters of one residence province/regency pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTotals {
    pub province: String,
    pub regency: String,
    pub totals: StatusTotals,
}
