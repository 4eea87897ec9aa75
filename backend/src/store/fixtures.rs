//! Test data shared by store and domain tests.

use super::records::NewParticipant;
use super::Database;
use common::model::participant::{Address, ParticipantStatus};
use rusqlite::params;

pub(crate) fn address() -> Address {
    Address {
        address: "JL. MERDEKA 10".into(),
        rt: "001".into(),
        rw: "002".into(),
        province: "JAWA BARAT".into(),
        regency: "KOTA BANDUNG".into(),
        district: "COBLONG".into(),
        village: "DAGO".into(),
        postal_code: "40135".into(),
    }
}

pub(crate) fn new_participant(nik: &str) -> NewParticipant {
    NewParticipant {
        name: "SITI AMINAH".into(),
        nik: nik.into(),
        gender: "P".into(),
        phone: "081234567890".into(),
        ktp: address(),
        residence: address(),
        status: ParticipantStatus::NotDone,
        image: String::new(),
        image_penerima: String::new(),
        is_represented: false,
        reference: String::new(),
        kind: "REGULER".into(),
        updated_by: "seed".into(),
    }
}

pub(crate) fn seed_regions(db: &Database) {
    db.with_conn(|conn| {
        conn.execute_batch(
            "INSERT INTO provinces (id, name) VALUES (32, 'JAWA BARAT'), (36, 'BANTEN');
             INSERT INTO regencies (id, province_id, name) VALUES
                 (3273, 32, 'KOTA BANDUNG'), (3271, 32, 'KOTA BOGOR'), (3671, 36, 'KOTA TANGERANG');
             INSERT INTO districts (id, regency_id, name) VALUES (327302, 3273, 'COBLONG');
             INSERT INTO villages (id, district_id, name) VALUES (3273021001, 327302, 'DAGO');",
        )?;
        Ok(())
    })
    .unwrap();
}

/// Two live organizations and one deleted one.
pub(crate) fn seed_organizations(db: &Database) {
    db.with_conn(|conn| {
        conn.execute_batch(
            "INSERT INTO organizations (id, name, created_at, updated_at, deleted_at) VALUES
                 (2, 'YAYASAN PEDULI', '2024-01-02 00:00:00+00:00', '2024-01-02 00:00:00+00:00', NULL),
                 (1, 'EO NUSANTARA', '2024-01-01 00:00:00+00:00', '2024-01-01 00:00:00+00:00', NULL),
                 (3, 'EO LAMA', '2024-01-03 00:00:00+00:00', '2024-01-03 00:00:00+00:00', '2024-02-01 00:00:00+00:00');",
        )?;
        Ok(())
    })
    .unwrap();
}

pub(crate) fn seed_quota(db: &Database, province: &str, regency: &str, kind: &str, total: i64) {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO quotas (total, province, regency, type) VALUES (?1, ?2, ?3, ?4)",
            params![total, province, regency, kind],
        )?;
        Ok(())
    })
    .unwrap();
}
