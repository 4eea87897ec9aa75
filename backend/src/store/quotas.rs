use super::{Database, QuotaStore};
use crate::error::AppResult;
use common::model::quota::Quota;
use rusqlite::{params, OptionalExtension};

impl QuotaStore for Database {
    fn find(&self, province: &str, regency: &str, kind: &str) -> AppResult<Option<Quota>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, total, province, regency, type FROM quotas \
                     WHERE (?1 = '' OR province = ?1) AND (?2 = '' OR regency = ?2) \
                     AND (?3 = '' OR type = ?3) ORDER BY id LIMIT 1",
                    params![province, regency, kind],
                    |row| {
                        Ok(Quota {
                            id: row.get(0)?,
                            total: row.get(1)?,
                            province: row.get(2)?,
                            regency: row.get(3)?,
                            kind: row.get(4)?,
                        })
                    },
                )
                .optional()?)
        })
    }
}
