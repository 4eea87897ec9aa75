//! SQLite persistence.
//!
//! One connection behind a mutex serves the whole process. Each table is
//! reached through a narrow trait so the domain code can be exercised
//! against any implementation; [`Database`] implements all of them.

mod filter;
mod import_logs;
mod participants;
mod quotas;
mod records;
mod regions;
mod schema;
mod users;

#[cfg(test)]
pub(crate) mod fixtures;

pub use filter::{non_blank, AddressScope, Page, ParticipantFilter};
pub use records::{NewImportLog, NewParticipant, NewUser, ParticipantEdit, StatusChange, UserUpdate};

use crate::error::{AppError, AppResult};
use common::model::dashboard::{RegionTotals, StatusTotals};
use common::model::import_log::ImportLog;
use common::model::organization::Organization;
use common::model::participant::Participant;
use common::model::quota::Quota;
use common::model::region::{District, Province, Regency, Village};
use common::model::user::User;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> AppResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::migrate(&conn)?;
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> AppResult<T>) -> AppResult<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database connection lock poisoned".to_string()))?;
        f(&mut conn)
    }
}

pub(crate) const NIK_TAKEN: &str = "NIK sudah terdaftar";

/// Turns a unique-index violation into [`AppError::Conflict`].
fn conflict_on_unique(err: rusqlite::Error, message: &str) -> AppError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            AppError::Conflict(message.to_string())
        }
        _ => err.into(),
    }
}

pub trait ParticipantStore: Send + Sync {
    /// Active participant by id.
    fn find_by_id(&self, id: i64) -> AppResult<Option<Participant>>;
    fn list(&self, filter: &ParticipantFilter, page: Page) -> AppResult<Vec<Participant>>;
    fn count(&self, filter: &ParticipantFilter) -> AppResult<i64>;
    /// Whether an active participant other than `except_id` holds `nik`.
    fn nik_taken(&self, nik: &str, except_id: Option<i64>) -> AppResult<bool>;
    fn create(&self, new: &NewParticipant) -> AppResult<Participant>;
    fn update_status(&self, id: i64, change: &StatusChange) -> AppResult<Participant>;
    fn update(&self, id: i64, edit: &ParticipantEdit) -> AppResult<Participant>;
    /// Marks `id` rejected and soft-deleted, then inserts `replacement`, all in
    /// one transaction. A conflicting NIK leaves everything untouched.
    fn replace_rejected(&self, id: i64, replacement: &NewParticipant) -> AppResult<Participant>;
    fn reset(&self, id: i64) -> AppResult<Participant>;
    fn soft_delete(&self, id: i64) -> AppResult<()>;
    fn mark_printed(&self, ids: &[i64]) -> AppResult<usize>;
    /// Status counts of active rows; `rejected` also counts soft-deleted rows.
    fn count_by_status(&self, filter: &ParticipantFilter) -> AppResult<StatusTotals>;
    /// Same counts grouped by residence province and regency.
    fn count_by_region(&self, filter: &ParticipantFilter) -> AppResult<Vec<RegionTotals>>;
    /// Hard-deletes rejected originals whose NIK is held by an active row.
    fn purge_replaced_rejections(&self) -> AppResult<usize>;
}

pub trait ImportLogStore: Send + Sync {
    fn create(&self, log: &NewImportLog) -> AppResult<ImportLog>;
    fn list(&self, search: &str, page: Page) -> AppResult<Vec<ImportLog>>;
    fn count(&self, search: &str) -> AppResult<i64>;
}

/// Region names are matched exactly, so callers pass them upper-cased.
pub trait RegionLookup: Send + Sync {
    fn find_province(&self, name: &str) -> AppResult<Option<Province>>;
    fn find_regency(&self, name: &str) -> AppResult<Option<Regency>>;
    fn provinces(&self, search: &str) -> AppResult<Vec<Province>>;
    fn regencies(&self, province_id: i64) -> AppResult<Vec<Regency>>;
    fn districts(&self, regency_id: i64) -> AppResult<Vec<District>>;
    fn villages(&self, district_id: i64) -> AppResult<Vec<Village>>;
}

pub trait QuotaStore: Send + Sync {
    /// First quota matching the given criteria; blank criteria match any.
    fn find(&self, province: &str, regency: &str, kind: &str) -> AppResult<Option<Quota>>;
}

pub trait UserStore: Send + Sync {
    fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    fn create(&self, new: &NewUser) -> AppResult<User>;
    fn update(&self, id: i64, update: &UserUpdate) -> AppResult<User>;
    fn set_retry_attempts(&self, id: i64, attempts: i64) -> AppResult<()>;
    fn soft_delete(&self, id: i64) -> AppResult<()>;
    fn list(&self, search: &str, page: Page) -> AppResult<Vec<User>>;
    fn count(&self, search: &str) -> AppResult<i64>;
    /// Organizations that are not deleted, by id.
    fn organizations(&self) -> AppResult<Vec<Organization>>;
}
