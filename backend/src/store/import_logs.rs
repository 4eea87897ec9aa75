use super::filter::Page;
use super::records::NewImportLog;
use super::{Database, ImportLogStore};
use crate::error::{AppError, AppResult};
use chrono::Utc;
use common::model::import_log::{ImportLog, ImportStatus};
use rusqlite::types::Type;
use rusqlite::{params, Row};

const COLUMNS: &str = "id, file_name, status, total_rows, success_rows, failed_rows, \
    path, reference, uploaded_by, type, created_at";

fn import_log_from_row(row: &Row) -> rusqlite::Result<ImportLog> {
    let status: String = row.get(2)?;
    let status = ImportStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown import status '{status}'").into(),
        )
    })?;
    Ok(ImportLog {
        id: row.get(0)?,
        file_name: row.get(1)?,
        status,
        total_rows: row.get(3)?,
        success_rows: row.get(4)?,
        failed_rows: row.get(5)?,
        path: row.get(6)?,
        reference: row.get(7)?,
        uploaded_by: row.get(8)?,
        kind: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn contains_pattern(search: &str) -> String {
    format!("%{}%", search.trim())
}

/// One row per bulk import. Rows are written once and never updated.
impl ImportLogStore for Database {
    fn create(&self, log: &NewImportLog) -> AppResult<ImportLog> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO import_logs (file_name, status, total_rows, success_rows, \
                 failed_rows, path, reference, uploaded_by, type, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    log.file_name,
                    log.status.as_str(),
                    log.total_rows,
                    log.success_rows,
                    log.failed_rows,
                    log.path,
                    log.reference,
                    log.uploaded_by,
                    log.kind,
                    Utc::now(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM import_logs WHERE id = ?1"),
                params![id],
                import_log_from_row,
            )
            .map_err(AppError::from)
        })
    }

    fn list(&self, search: &str, page: Page) -> AppResult<Vec<ImportLog>> {
        let (limit, offset) = page.limit_offset();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM import_logs WHERE file_name LIKE ?1 \
                 ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt.query_map(
                params![contains_pattern(search), limit, offset],
                import_log_from_row,
            )?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    fn count(&self, search: &str) -> AppResult<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM import_logs WHERE file_name LIKE ?1",
                params![contains_pattern(search)],
                |row| row.get(0),
            )?)
        })
    }
}
