use serde::{Deserialize, Serialize};

/// A generated file handed back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFile {
    pub name: String,
    pub path: String,
}

/// Result of a printable report export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedReport {
    pub files: Vec<ReportFile>,
    /// Background jobs marking the exported participants as printed.
    pub print_jobs: Vec<String>,
}
