use super::filter::{Page, ParticipantFilter};
use super::records::{NewParticipant, ParticipantEdit, StatusChange};
use super::{conflict_on_unique, Database, ParticipantStore, NIK_TAKEN};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use common::model::dashboard::{RegionTotals, StatusTotals};
use common::model::participant::{Address, Participant, ParticipantStatus, UnknownStatus};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, name, nik, gender, phone, \
    address, rt, rw, province, regency, district, village, postal_code, \
    residence_address, residence_rt, residence_rw, residence_province, residence_regency, \
    residence_district, residence_village, residence_postal_code, \
    status, image, image_penerima, is_represented, has_printed, reference, type, updated_by, \
    created_at, updated_at, deleted_at";

/// Status counters shared by the dashboard queries. `rejected` counts
/// soft-deleted rows too; everything else only active ones.
const TOTALS: &str = "COUNT(CASE WHEN deleted_at IS NULL THEN 1 END), \
    COUNT(CASE WHEN deleted_at IS NULL AND status = 'DONE' THEN 1 END), \
    COUNT(CASE WHEN deleted_at IS NULL AND status = 'PARTIAL_DONE' THEN 1 END), \
    COUNT(CASE WHEN deleted_at IS NULL AND status = 'NOT DONE' THEN 1 END), \
    COUNT(CASE WHEN status = 'REJECTED' THEN 1 END)";

fn address_at(row: &Row, start: usize) -> rusqlite::Result<Address> {
    Ok(Address {
        address: row.get(start)?,
        rt: row.get(start + 1)?,
        rw: row.get(start + 2)?,
        province: row.get(start + 3)?,
        regency: row.get(start + 4)?,
        district: row.get(start + 5)?,
        village: row.get(start + 6)?,
        postal_code: row.get(start + 7)?,
    })
}

fn participant_from_row(row: &Row) -> rusqlite::Result<Participant> {
    let status: String = row.get(21)?;
    let status = ParticipantStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(21, Type::Text, Box::new(UnknownStatus(status)))
    })?;
    Ok(Participant {
        id: row.get(0)?,
        name: row.get(1)?,
        nik: row.get(2)?,
        gender: row.get(3)?,
        phone: row.get(4)?,
        ktp: address_at(row, 5)?,
        residence: address_at(row, 13)?,
        status,
        image: row.get(22)?,
        image_penerima: row.get(23)?,
        is_represented: row.get(24)?,
        has_printed: row.get(25)?,
        reference: row.get(26)?,
        kind: row.get(27)?,
        updated_by: row.get(28)?,
        created_at: row.get(29)?,
        updated_at: row.get(30)?,
        deleted_at: row.get(31)?,
    })
}

fn totals_from_row(row: &Row, start: usize) -> rusqlite::Result<StatusTotals> {
    Ok(StatusTotals {
        total: row.get(start)?,
        done: row.get(start + 1)?,
        partial_done: row.get(start + 2)?,
        not_done: row.get(start + 3)?,
        rejected: row.get(start + 4)?,
        remaining_quota: 0,
    })
}

fn find_active(conn: &Connection, id: i64) -> rusqlite::Result<Option<Participant>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM participants WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        participant_from_row,
    )
    .optional()
}

fn require_active(conn: &Connection, id: i64) -> AppResult<Participant> {
    find_active(conn, id)?.ok_or_else(|| AppError::not_found("participant"))
}

fn nik_taken_in(conn: &Connection, nik: &str, except_id: Option<i64>) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM participants \
         WHERE nik = ?1 AND deleted_at IS NULL AND (?2 IS NULL OR id <> ?2))",
        params![nik, except_id],
        |row| row.get(0),
    )
}

fn insert(conn: &Connection, new: &NewParticipant, now: DateTime<Utc>) -> AppResult<i64> {
    let (k, r) = (&new.ktp, &new.residence);
    conn.execute(
        "INSERT INTO participants (name, nik, gender, phone, \
         address, rt, rw, province, regency, district, village, postal_code, \
         residence_address, residence_rt, residence_rw, residence_province, residence_regency, \
         residence_district, residence_village, residence_postal_code, \
         status, image, image_penerima, is_represented, reference, type, updated_by, \
         created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, \
         ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?28)",
        params![
            new.name,
            new.nik,
            new.gender,
            new.phone,
            k.address,
            k.rt,
            k.rw,
            k.province,
            k.regency,
            k.district,
            k.village,
            k.postal_code,
            r.address,
            r.rt,
            r.rw,
            r.province,
            r.regency,
            r.district,
            r.village,
            r.postal_code,
            new.status.as_str(),
            new.image,
            new.image_penerima,
            new.is_represented,
            new.reference,
            new.kind,
            new.updated_by,
            now,
        ],
    )
    .map_err(|e| conflict_on_unique(e, NIK_TAKEN))?;
    Ok(conn.last_insert_rowid())
}

/// SQLite implementation of the participant table.
///
/// Every read and write here ignores soft-deleted rows unless the filter asks
/// for them (`include_deleted`, used by the dashboard totals). Writes that
/// touch the NIK map a unique-index violation to `Conflict` with the same
/// message the pre-checks use, so callers see one error for both paths.
impl ParticipantStore for Database {
    fn find_by_id(&self, id: i64) -> AppResult<Option<Participant>> {
        self.with_conn(|conn| Ok(find_active(conn, id)?))
    }

    /// Matching active rows in creation order. A page size of 0 returns
    /// everything (`Page::limit_offset` yields `LIMIT -1`).
    fn list(&self, filter: &ParticipantFilter, page: Page) -> AppResult<Vec<Participant>> {
        let (where_sql, mut values) = filter.where_clause();
        let (limit, offset) = page.limit_offset();
        values.push(Value::Integer(limit));
        values.push(Value::Integer(offset));
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM participants {where_sql} \
                 ORDER BY created_at, id LIMIT ? OFFSET ?"
            ))?;
            let rows = stmt.query_map(params_from_iter(values), participant_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    fn count(&self, filter: &ParticipantFilter) -> AppResult<i64> {
        let (where_sql, values) = filter.where_clause();
        self.with_conn(|conn| {
            Ok(conn.query_row(
                &format!("SELECT COUNT(*) FROM participants {where_sql}"),
                params_from_iter(values),
                |row| row.get(0),
            )?)
        })
    }

    /// Whether an active participant other than `except_id` holds `nik`.
    fn nik_taken(&self, nik: &str, except_id: Option<i64>) -> AppResult<bool> {
        self.with_conn(|conn| Ok(nik_taken_in(conn, nik, except_id)?))
    }

    fn create(&self, new: &NewParticipant) -> AppResult<Participant> {
        self.with_conn(|conn| {
            let id = insert(conn, new, Utc::now())?;
            require_active(conn, id)
        })
    }

    /// Sets status and editor in place. `None` images keep the stored ones
    /// (`COALESCE`), which is how a blank photo on `DONE` is honoured.
    fn update_status(&self, id: i64, change: &StatusChange) -> AppResult<Participant> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE participants SET status = ?1, updated_by = ?2, updated_at = ?3, \
                 image = COALESCE(?4, image), image_penerima = COALESCE(?5, image_penerima) \
                 WHERE id = ?6 AND deleted_at IS NULL",
                params![
                    change.status.as_str(),
                    change.updated_by,
                    Utc::now(),
                    change.image,
                    change.image_penerima,
                    id
                ],
            )?;
            if changed == 0 {
                return Err(AppError::not_found("participant"));
            }
            require_active(conn, id)
        })
    }

    /// Overwrites every editable column. Fallbacks to stored values are
    /// resolved by the caller before this runs.
    fn update(&self, id: i64, edit: &ParticipantEdit) -> AppResult<Participant> {
        let (k, r) = (&edit.ktp, &edit.residence);
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE participants SET name = ?1, nik = ?2, gender = ?3, phone = ?4, \
                     address = ?5, rt = ?6, rw = ?7, province = ?8, regency = ?9, \
                     district = ?10, village = ?11, postal_code = ?12, \
                     residence_address = ?13, residence_rt = ?14, residence_rw = ?15, \
                     residence_province = ?16, residence_regency = ?17, \
                     residence_district = ?18, residence_village = ?19, \
                     residence_postal_code = ?20, status = ?21, image = ?22, \
                     image_penerima = ?23, type = ?24, updated_by = ?25, updated_at = ?26 \
                     WHERE id = ?27 AND deleted_at IS NULL",
                    params![
                        edit.name,
                        edit.nik,
                        edit.gender,
                        edit.phone,
                        k.address,
                        k.rt,
                        k.rw,
                        k.province,
                        k.regency,
                        k.district,
                        k.village,
                        k.postal_code,
                        r.address,
                        r.rt,
                        r.rw,
                        r.province,
                        r.regency,
                        r.district,
                        r.village,
                        r.postal_code,
                        edit.status.as_str(),
                        edit.image,
                        edit.image_penerima,
                        edit.kind,
                        edit.updated_by,
                        Utc::now(),
                        id,
                    ],
                )
                .map_err(|e| conflict_on_unique(e, NIK_TAKEN))?;
            if changed == 0 {
                return Err(AppError::not_found("participant"));
            }
            require_active(conn, id)
        })
    }

    /// Retires row `id` as `REJECTED` and inserts `replacement` in one
    /// transaction.
    ///
    /// The original is soft-deleted first, so the replacement may reuse its
    /// NIK. Any early return drops `tx` uncommitted, which rolls back the
    /// retirement as well.
    fn replace_rejected(&self, id: i64, replacement: &NewParticipant) -> AppResult<Participant> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let now = Utc::now();
            let changed = tx.execute(
                "UPDATE participants SET status = ?1, updated_by = ?2, updated_at = ?3, \
                 deleted_at = ?3 WHERE id = ?4 AND deleted_at IS NULL",
                params![
                    ParticipantStatus::Rejected.as_str(),
                    replacement.updated_by,
                    now,
                    id
                ],
            )?;
            if changed == 0 {
                return Err(AppError::not_found("participant"));
            }
            if nik_taken_in(&tx, &replacement.nik, None)? {
                return Err(AppError::Conflict(NIK_TAKEN.to_string()));
            }
            let new_id = insert(&tx, replacement, now)?;
            let created = require_active(&tx, new_id)?;
            tx.commit()?;
            Ok(created)
        })
    }

    /// Back to `NOT DONE`, with both images and the printed flag cleared.
    fn reset(&self, id: i64) -> AppResult<Participant> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE participants SET status = ?1, image = '', image_penerima = '', \
                 has_printed = 0, updated_at = ?2 WHERE id = ?3 AND deleted_at IS NULL",
                params![ParticipantStatus::NotDone.as_str(), Utc::now(), id],
            )?;
            if changed == 0 {
                return Err(AppError::not_found("participant"));
            }
            require_active(conn, id)
        })
    }

    fn soft_delete(&self, id: i64) -> AppResult<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE participants SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
                params![Utc::now(), id],
            )?;
            if changed == 0 {
                return Err(AppError::not_found("participant"));
            }
            Ok(())
        })
    }

    /// Flags the given rows as printed and returns how many were updated.
    /// Soft-deleted rows are flagged too; the report read them while active.
    fn mark_printed(&self, ids: &[i64]) -> AppResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        self.with_conn(|conn| {
            Ok(conn.execute(
                &format!("UPDATE participants SET has_printed = 1 WHERE id IN ({placeholders})"),
                params_from_iter(ids),
            )?)
        })
    }

    /// Dashboard counters over the filter. Soft-deleted rows are scanned so
    /// that retired `REJECTED` originals are counted; the other counters
    /// only look at active rows (see `TOTALS`).
    fn count_by_status(&self, filter: &ParticipantFilter) -> AppResult<StatusTotals> {
        let filter = ParticipantFilter {
            include_deleted: true,
            ..filter.clone()
        };
        let (where_sql, values) = filter.where_clause();
        self.with_conn(|conn| {
            Ok(conn.query_row(
                &format!("SELECT {TOTALS} FROM participants {where_sql}"),
                params_from_iter(values),
                |row| totals_from_row(row, 0),
            )?)
        })
    }

    /// The same counters grouped by residence province and regency.
    fn count_by_region(&self, filter: &ParticipantFilter) -> AppResult<Vec<RegionTotals>> {
        let filter = ParticipantFilter {
            include_deleted: true,
            ..filter.clone()
        };
        let (mut clauses, values) = filter.conditions();
        clauses.push("(deleted_at IS NULL OR status = 'REJECTED')".to_string());
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT residence_province, residence_regency, {TOTALS} FROM participants \
                 WHERE {} GROUP BY residence_province, residence_regency \
                 ORDER BY residence_province, residence_regency",
                clauses.join(" AND ")
            ))?;
            let rows = stmt.query_map(params_from_iter(values), |row| {
                Ok(RegionTotals {
                    province: row.get(0)?,
                    regency: row.get(1)?,
                    totals: totals_from_row(row, 2)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Hard-deletes retired `REJECTED` rows whose NIK has an active holder.
    fn purge_replaced_rejections(&self) -> AppResult<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM participants WHERE deleted_at IS NOT NULL AND status = 'REJECTED' \
                 AND nik IN (SELECT nik FROM participants WHERE deleted_at IS NULL)",
                [],
            )?)
        })
    }
}
