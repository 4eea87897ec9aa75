//! Table layout, created on open. Statements are idempotent, so opening an
//! existing database is a no-op.
//!
//! Soft deletes set `deleted_at`; the partial unique indexes only cover live
//! rows, which lets a retired NIK or username be used again.

use rusqlite::Connection;

const MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS participants (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    name                  TEXT    NOT NULL,
    nik                   TEXT    NOT NULL,
    gender                TEXT    NOT NULL DEFAULT '',
    phone                 TEXT    NOT NULL DEFAULT '',
    address               TEXT    NOT NULL DEFAULT '',
    rt                    TEXT    NOT NULL DEFAULT '',
    rw                    TEXT    NOT NULL DEFAULT '',
    province              TEXT    NOT NULL DEFAULT '',
    regency               TEXT    NOT NULL DEFAULT '',
    district              TEXT    NOT NULL DEFAULT '',
    village               TEXT    NOT NULL DEFAULT '',
    postal_code           TEXT    NOT NULL DEFAULT '',
    residence_address     TEXT    NOT NULL DEFAULT '',
    residence_rt          TEXT    NOT NULL DEFAULT '',
    residence_rw          TEXT    NOT NULL DEFAULT '',
    residence_province    TEXT    NOT NULL DEFAULT '',
    residence_regency     TEXT    NOT NULL DEFAULT '',
    residence_district    TEXT    NOT NULL DEFAULT '',
    residence_village     TEXT    NOT NULL DEFAULT '',
    residence_postal_code TEXT    NOT NULL DEFAULT '',
    status                TEXT    NOT NULL DEFAULT 'NOT DONE',
    image                 TEXT    NOT NULL DEFAULT '',
    image_penerima        TEXT    NOT NULL DEFAULT '',
    is_represented        INTEGER NOT NULL DEFAULT 0,
    has_printed           INTEGER NOT NULL DEFAULT 0,
    reference             TEXT    NOT NULL DEFAULT '',
    type                  TEXT    NOT NULL DEFAULT '',
    updated_by            TEXT    NOT NULL DEFAULT '',
    created_at            TEXT    NOT NULL,
    updated_at            TEXT    NOT NULL,
    deleted_at            TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS participants_active_nik
    ON participants (nik) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS participants_residence
    ON participants (residence_province, residence_regency);

CREATE TABLE IF NOT EXISTS import_logs (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name    TEXT    NOT NULL,
    status       TEXT    NOT NULL,
    total_rows   INTEGER NOT NULL,
    success_rows INTEGER NOT NULL,
    failed_rows  INTEGER NOT NULL,
    path         TEXT,
    reference    TEXT,
    uploaded_by  TEXT    NOT NULL DEFAULT '',
    type         TEXT    NOT NULL DEFAULT '',
    created_at   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS provinces (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS regencies (
    id          INTEGER PRIMARY KEY,
    province_id INTEGER NOT NULL REFERENCES provinces (id),
    name        TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS districts (
    id         INTEGER PRIMARY KEY,
    regency_id INTEGER NOT NULL REFERENCES regencies (id),
    name       TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS villages (
    id          INTEGER PRIMARY KEY,
    district_id INTEGER NOT NULL REFERENCES districts (id),
    name        TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS quotas (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    total    INTEGER NOT NULL,
    province TEXT    NOT NULL,
    regency  TEXT    NOT NULL,
    type     TEXT    NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT    NOT NULL,
    username       TEXT    NOT NULL,
    password       TEXT    NOT NULL,
    role           TEXT    NOT NULL,
    organization_id INTEGER NOT NULL DEFAULT 0,
    province       TEXT    NOT NULL DEFAULT '',
    regency        TEXT    NOT NULL DEFAULT '',
    retry_attempts INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT    NOT NULL,
    updated_at     TEXT    NOT NULL,
    deleted_at     TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS users_active_username
    ON users (username) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS organizations (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT    NOT NULL,
    created_at TEXT    NOT NULL,
    updated_at TEXT    NOT NULL,
    deleted_at TEXT
);
"#;

pub(super) fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(MIGRATION)
}
