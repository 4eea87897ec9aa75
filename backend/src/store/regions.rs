use super::{Database, RegionLookup};
use crate::error::AppResult;
use common::model::region::{District, Province, Regency, Village};
use rusqlite::{params, OptionalExtension};

impl RegionLookup for Database {
    fn find_province(&self, name: &str) -> AppResult<Option<Province>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, name FROM provinces WHERE name = ?1 LIMIT 1",
                    params![name],
                    |row| {
                        Ok(Province {
                            id: row.get(0)?,
                            name: row.get(1)?,
                        })
                    },
                )
                .optional()?)
        })
    }

    fn find_regency(&self, name: &str) -> AppResult<Option<Regency>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, province_id, name FROM regencies WHERE name = ?1 LIMIT 1",
                    params![name],
                    |row| {
                        Ok(Regency {
                            id: row.get(0)?,
                            province_id: row.get(1)?,
                            name: row.get(2)?,
                        })
                    },
                )
                .optional()?)
        })
    }

    fn provinces(&self, search: &str) -> AppResult<Vec<Province>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name FROM provinces WHERE name LIKE ?1 ORDER BY name")?;
            let rows = stmt.query_map(params![format!("{}%", search.trim().to_uppercase())], |row| {
                Ok(Province {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    fn regencies(&self, province_id: i64) -> AppResult<Vec<Regency>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, province_id, name FROM regencies WHERE province_id = ?1 ORDER BY name",
            )?;
            let rows = stmt.query_map(params![province_id], |row| {
                Ok(Regency {
                    id: row.get(0)?,
                    province_id: row.get(1)?,
                    name: row.get(2)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    fn districts(&self, regency_id: i64) -> AppResult<Vec<District>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, regency_id, name FROM districts WHERE regency_id = ?1 ORDER BY name",
            )?;
            let rows = stmt.query_map(params![regency_id], |row| {
                Ok(District {
                    id: row.get(0)?,
                    regency_id: row.get(1)?,
                    name: row.get(2)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    fn villages(&self, district_id: i64) -> AppResult<Vec<Village>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, district_id, name FROM villages WHERE district_id = ?1 ORDER BY name",
            )?;
            let rows = stmt.query_map(params![district_id], |row| {
                Ok(Village {
                    id: row.get(0)?,
                    district_id: row.get(1)?,
                    name: row.get(2)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}
