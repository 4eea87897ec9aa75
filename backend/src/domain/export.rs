//! Downloadable exports. Files are written through [`Storage`] and
//! scheduled for removal once the download window has passed.

use super::dashboard::residence_filter;
use super::import::sheet::HEADERS;
use crate::error::{AppError, AppResult};
use crate::storage::Storage;
use crate::store::{Page, ParticipantStore};
use chrono::Utc;
use common::model::participant::{Participant, ParticipantStatus};
use common::requests::DashboardQuery;
use rust_xlsxwriter::Workbook;
use std::sync::Arc;
use std::time::Duration;

const DASHBOARD_HEADERS: [&str; 7] = [
    "Provinsi",
    "Kota",
    "Total Penerima Bantuan Kota Anda",
    "Sudah Menerima Bantuan",
    "Belum Unggah Foto Penerima Bantuan",
    "Belum Menerima Bantuan",
    "Data Tidak Sesuai",
];

const KIND_HEADER: &str = "Tipe";

/// Deletes a stored file after a delay.
pub trait ExpirySchedule: Send + Sync {
    fn expire(&self, key: &str, after: Duration);
}

fn participant_cells(p: &Participant) -> [&str; 22] {
    let (k, r) = (&p.ktp, &p.residence);
    [
        &p.name,
        &p.nik,
        &p.gender,
        &p.phone,
        &k.address,
        &k.rt,
        &k.rw,
        &k.province,
        &k.regency,
        &k.district,
        &k.village,
        &k.postal_code,
        &r.address,
        &r.rt,
        &r.rw,
        &r.province,
        &r.regency,
        &r.district,
        &r.village,
        &r.postal_code,
        p.status.as_str(),
        &p.kind,
    ]
}

fn stamped(label: &str, ext: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{label}-{}.{ext}",
        Utc::now().format("%Y%m%d%H%M%S"),
        &suffix[..8]
    )
}

#[derive(Clone)]
pub struct Exporter {
    participants: Arc<dyn ParticipantStore>,
    storage: Arc<dyn Storage>,
    expiry: Arc<dyn ExpirySchedule>,
    ttl: Duration,
}

impl Exporter {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        storage: Arc<dyn Storage>,
        expiry: Arc<dyn ExpirySchedule>,
        ttl: Duration,
    ) -> Self {
        Exporter {
            participants,
            storage,
            expiry,
            ttl,
        }
    }

    fn publish(&self, name: &str, bytes: &[u8]) -> AppResult<String> {
        let key = self.storage.save(name, bytes)?;
        self.expiry.expire(&key, self.ttl);
        Ok(self.storage.url(&key))
    }

    /// One line per residence province and regency with the status counters.
    pub fn dashboard_workbook(&self, query: &DashboardQuery) -> AppResult<String> {
        let regions = self
            .participants
            .count_by_region(&residence_filter(query)?)?;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name("Sheet1")?;
        for (col, title) in DASHBOARD_HEADERS.iter().enumerate() {
            sheet.write_string(0, col as u16, *title)?;
        }
        for (index, region) in regions.iter().enumerate() {
            let row = (index + 1) as u32;
            let t = &region.totals;
            sheet.write_string(row, 0, &region.province)?;
            sheet.write_string(row, 1, &region.regency)?;
            for (offset, value) in [t.total, t.done, t.partial_done, t.not_done, t.rejected]
                .into_iter()
                .enumerate()
            {
                sheet.write_number(row, 2 + offset as u16, value as f64)?;
            }
        }

        self.publish(&stamped("dashboard", "xlsx"), &workbook.save_to_buffer()?)
    }

    fn export_rows(&self, query: &DashboardQuery) -> AppResult<Vec<Participant>> {
        let mut filter = residence_filter(query)?;
        filter.status = ParticipantStatus::parse(&query.status);
        self.participants.list(&filter, Page::all())
    }

    pub fn data_workbook(&self, query: &DashboardQuery) -> AppResult<String> {
        let rows = self.export_rows(query)?;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name("Sheet1")?;
        for (col, title) in HEADERS.iter().chain([&KIND_HEADER]).enumerate() {
            sheet.write_string(0, col as u16, *title)?;
        }
        for (index, participant) in rows.iter().enumerate() {
            for (col, value) in participant_cells(participant).iter().enumerate() {
                sheet.write_string((index + 1) as u32, col as u16, *value)?;
            }
        }

        self.publish(&stamped("export-data", "xlsx"), &workbook.save_to_buffer()?)
    }

    /// Same columns as the workbook. The NIK gets a leading `'` so
    /// spreadsheet tools keep it as text.
    pub fn data_csv(&self, query: &DashboardQuery) -> AppResult<String> {
        let rows = self.export_rows(query)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(HEADERS.iter().chain([&KIND_HEADER]))?;
        for participant in &rows {
            let mut cells = participant_cells(participant).map(str::to_string);
            cells[1] = format!("'{}", participant.nik);
            writer.write_record(&cells)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Spreadsheet(e.to_string()))?;

        self.publish(&stamped("export-data", "csv"), &bytes)
    }
}
