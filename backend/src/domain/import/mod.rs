//! Bulk import of beneficiaries from a spreadsheet.
//!
//! Every data row is validated; valid rows become participants sharing one
//! batch reference, the rest are written to an error workbook annotated
//! with the reasons. The outcome is recorded as an [`ImportLog`].

pub mod rules;
pub mod sheet;

use crate::error::{AppError, AppResult};
use crate::storage::{unique_name, Storage};
use crate::store::{ImportLogStore, NewImportLog, NewParticipant, ParticipantStore, RegionLookup};
use common::model::import_log::{ImportLog, ImportStatus};
use common::model::participant::ParticipantStatus;
use log::info;
use rand::distr::Alphanumeric;
use rand::Rng;
use rules::RowValidator;
use sheet::ImportRow;
use std::sync::Arc;

const REFERENCE_LEN: usize = 20;
const NIK_REGISTERED: &str = "NIK Sudah Terdaftar \n";

pub struct ImportRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub uploaded_by: String,
    pub kind: String,
}

#[derive(Clone)]
pub struct BulkImporter {
    participants: Arc<dyn ParticipantStore>,
    logs: Arc<dyn ImportLogStore>,
    regions: Arc<dyn RegionLookup>,
    storage: Arc<dyn Storage>,
}

fn batch_reference() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(REFERENCE_LEN)
        .map(char::from)
        .collect()
}

impl BulkImporter {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        logs: Arc<dyn ImportLogStore>,
        regions: Arc<dyn RegionLookup>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        BulkImporter {
            participants,
            logs,
            regions,
            storage,
        }
    }

    /// Imports every row of the uploaded file. Only an unreadable file or a
    /// persistence failure is an error; participants created before such a
    /// failure stay.
    pub fn run(&self, request: &ImportRequest) -> AppResult<ImportLog> {
        let rows = sheet::read_rows(&request.file_name, &request.bytes)?;
        let reference = batch_reference();
        let validator = RowValidator::new(self.participants.as_ref(), self.regions.as_ref());

        let mut rejected: Vec<(ImportRow, String)> = Vec::new();
        let mut success_rows = 0u32;

        for row in rows {
            let notes = validator.validate(&row)?;
            if !notes.is_empty() {
                let note = notes.join(",");
                rejected.push((row, note));
                continue;
            }

            match self.participants.create(&participant_from(&row, &reference, &request.kind)) {
                Ok(_) => success_rows += 1,
                Err(AppError::Conflict(_)) => rejected.push((row, NIK_REGISTERED.to_string())),
                Err(e) => return Err(e),
            }
        }

        let failed_rows = rejected.len() as u32;
        let path = if rejected.is_empty() {
            None
        } else {
            let workbook = sheet::error_workbook(&rejected)?;
            let key = self.storage.save(&unique_name("errors.xlsx"), &workbook)?;
            Some(self.storage.url(&key))
        };

        let log = self.logs.create(&NewImportLog {
            file_name: request.file_name.clone(),
            status: ImportStatus::from_counts(success_rows, failed_rows),
            total_rows: success_rows + failed_rows,
            success_rows,
            failed_rows,
            path,
            reference: (success_rows > 0).then_some(reference),
            uploaded_by: request.uploaded_by.clone(),
            kind: request.kind.clone(),
        })?;

        info!(
            "Imported '{}': {} rows, {} accepted, {} rejected",
            log.file_name, log.total_rows, log.success_rows, log.failed_rows
        );
        Ok(log)
    }
}

fn participant_from(row: &ImportRow, reference: &str, kind: &str) -> NewParticipant {
    NewParticipant {
        name: row.name.clone(),
        nik: row.nik.clone(),
        gender: row.gender.clone(),
        phone: row.phone.clone(),
        ktp: row.ktp.with_uppercase_regions(),
        residence: row.residence.with_uppercase_regions(),
        status: ParticipantStatus::parse(&row.status).unwrap_or(ParticipantStatus::NotDone),
        image: String::new(),
        image_penerima: String::new(),
        is_represented: false,
        reference: reference.to_string(),
        kind: kind.to_string(),
        updated_by: String::new(),
    }
}
