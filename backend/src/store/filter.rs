use chrono::{DateTime, Utc};
use common::model::participant::ParticipantStatus;
use common::requests::ParticipantQuery;
use rusqlite::types::Value;

/// Which address block region filters apply to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressScope {
    /// The address printed on the identity card.
    #[default]
    Ktp,
    /// The current residence (domisili).
    Residence,
}

impl AddressScope {
    fn column(self, field: &str) -> String {
        match self {
            AddressScope::Ktp => field.to_string(),
            AddressScope::Residence => format!("residence_{field}"),
        }
    }
}

/// Typed participant filter. Every `Some` field adds one `AND` condition;
/// soft-deleted rows are excluded unless `include_deleted` is set.
#[derive(Debug, Clone, Default)]
pub struct ParticipantFilter {
    pub scope: AddressScope,
    pub province: Option<String>,
    pub regency: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub status: Option<ParticipantStatus>,
    pub kind: Option<String>,
    /// Name prefix.
    pub search: Option<String>,
    pub has_printed: Option<bool>,
    /// Half-open `[from, to)` window on `updated_at`.
    pub updated_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub include_deleted: bool,
}

/// `None` for blank input, the trimmed value otherwise.
pub fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ParticipantFilter {
    /// Listing filter from query-string parameters (KTP address block).
    pub fn from_query(query: &ParticipantQuery) -> Self {
        ParticipantFilter {
            province: non_blank(&query.province),
            regency: non_blank(&query.regency),
            district: non_blank(&query.district),
            village: non_blank(&query.village),
            status: ParticipantStatus::parse(&query.status),
            kind: non_blank(&query.kind),
            search: non_blank(&query.search),
            ..ParticipantFilter::default()
        }
    }

    pub(crate) fn conditions(&self) -> (Vec<String>, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        let regions = [
            ("province", &self.province),
            ("regency", &self.regency),
            ("district", &self.district),
            ("village", &self.village),
        ];
        for (field, value) in regions {
            if let Some(value) = value {
                clauses.push(format!("{} = ?", self.scope.column(field)));
                values.push(Value::Text(value.clone()));
            }
        }
        if let Some(status) = self.status {
            clauses.push("status = ?".to_string());
            values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(kind) = &self.kind {
            clauses.push("type = ?".to_string());
            values.push(Value::Text(kind.clone()));
        }
        if let Some(search) = &self.search {
            clauses.push("name LIKE ? ESCAPE '\\'".to_string());
            values.push(Value::Text(format!("{}%", escape_like(search))));
        }
        if let Some(printed) = self.has_printed {
            clauses.push("has_printed = ?".to_string());
            values.push(Value::Integer(printed as i64));
        }
        if let Some((from, to)) = self.updated_between {
            clauses.push("updated_at >= ? AND updated_at < ?".to_string());
            values.push(Value::Text(sql_timestamp(&from)));
            values.push(Value::Text(sql_timestamp(&to)));
        }
        if !self.include_deleted {
            clauses.push("deleted_at IS NULL".to_string());
        }
        (clauses, values)
    }

    /// `WHERE ...` (or nothing) plus the positional parameters it binds.
    pub(crate) fn where_clause(&self) -> (String, Vec<Value>) {
        let (clauses, values) = self.conditions();
        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

/// The textual form rusqlite's chrono support stores, so window bounds
/// compare lexicographically with stored timestamps.
fn sql_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%F %T%.f%:z").to_string()
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// One-based page number and size. A size of zero returns every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub size: u32,
}

impl Page {
    pub fn new(page: u32, size: u32) -> Self {
        Page { page, size }
    }

    pub fn all() -> Self {
        Page::default()
    }

    pub(crate) fn limit_offset(&self) -> (i64, i64) {
        if self.size == 0 {
            return (-1, 0);
        }
        let page = self.page.max(1) as i64;
        (self.size as i64, (page - 1) * self.size as i64)
    }
}
