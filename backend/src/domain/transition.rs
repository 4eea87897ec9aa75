//! Participant lifecycle.
//!
//! ```text
//! NOT DONE ──> PARTIAL_DONE ──> DONE
//!     │             │
//!     └─────────────┴──> REJECTED (original soft-deleted, corrected copy stored as DONE)
//! ```

use crate::error::{AppError, AppResult};
use crate::store::{NewParticipant, ParticipantEdit, ParticipantStore, StatusChange, NIK_TAKEN};
use common::model::participant::{Participant, ParticipantStatus};
use common::requests::UpdateParticipant;
use log::info;
use std::sync::Arc;

#[derive(Clone)]
pub struct StatusTransitions {
    store: Arc<dyn ParticipantStore>,
}

fn non_blank(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

fn or_stored(value: &str, stored: &str) -> String {
    non_blank(value).unwrap_or_else(|| stored.to_string())
}

impl StatusTransitions {
    pub fn new(store: Arc<dyn ParticipantStore>) -> Self {
        StatusTransitions { store }
    }

    pub fn get(&self, id: i64) -> AppResult<Participant> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found("participant"))
    }

    /// Moves a participant to the status named in `request`.
    ///
    /// `REJECTED` retires the current row and stores the submitted values as a
    /// new `DONE` participant of the same type. The target must be spelled
    /// exactly; blank, unknown and `NOT DONE` targets leave the record as it
    /// is.
    pub fn transition(&self, id: i64, request: &UpdateParticipant) -> AppResult<Participant> {
        let current = self.get(id)?;

        let updated = match ParticipantStatus::from_wire(&request.status) {
            Some(ParticipantStatus::PartialDone) => self.store.update_status(
                id,
                &StatusChange {
                    status: ParticipantStatus::PartialDone,
                    image: None,
                    image_penerima: None,
                    updated_by: request.updated_by.clone(),
                },
            )?,
            Some(ParticipantStatus::Done) => self.store.update_status(
                id,
                &StatusChange {
                    status: ParticipantStatus::Done,
                    image: non_blank(&request.image),
                    image_penerima: non_blank(&request.image_penerima),
                    updated_by: request.updated_by.clone(),
                },
            )?,
            Some(ParticipantStatus::Rejected) => {
                let replacement = NewParticipant {
                    name: request.name.clone(),
                    nik: request.nik.clone(),
                    gender: request.gender.clone(),
                    phone: request.phone.clone(),
                    ktp: request.ktp.clone(),
                    residence: request.residence.clone(),
                    status: ParticipantStatus::Done,
                    image: request.image.clone(),
                    image_penerima: request.image_penerima.clone(),
                    is_represented: false,
                    reference: String::new(),
                    kind: current.kind.clone(),
                    updated_by: request.updated_by.clone(),
                };
                let created = self.store.replace_rejected(id, &replacement)?;
                info!("Participant {id} rejected, replaced by {}", created.id);
                return Ok(created);
            }
            Some(ParticipantStatus::NotDone) | None => return Ok(current),
        };

        info!("Participant {id} moved to {}", updated.status);
        Ok(updated)
    }

    /// Corrects the fields of a participant. Blank images, type and editor
    /// keep their stored values; a blank or unknown status keeps the current
    /// status.
    pub fn edit(&self, id: i64, request: &UpdateParticipant) -> AppResult<Participant> {
        let current = self.get(id)?;
        if self.store.nik_taken(&request.nik, Some(id))? {
            return Err(AppError::Conflict(NIK_TAKEN.to_string()));
        }

        let edit = ParticipantEdit {
            name: request.name.clone(),
            nik: request.nik.clone(),
            gender: request.gender.clone(),
            phone: request.phone.clone(),
            ktp: request.ktp.clone(),
            residence: request.residence.clone(),
            status: ParticipantStatus::parse(&request.status).unwrap_or(current.status),
            image: or_stored(&request.image, &current.image),
            image_penerima: or_stored(&request.image_penerima, &current.image_penerima),
            kind: or_stored(&request.kind, &current.kind),
            updated_by: or_stored(&request.updated_by, &current.updated_by),
        };
        self.store.update(id, &edit)
    }

    /// Back to `NOT DONE` with images and the printed flag cleared.
    pub fn reset(&self, id: i64) -> AppResult<Participant> {
        self.store.reset(id)
    }

    pub fn delete(&self, id: i64) -> AppResult<()> {
        self.store.soft_delete(id)
    }

    /// Drops the rejected originals that have an active replacement.
    pub fn cleanup_duplicates(&self) -> AppResult<usize> {
        let purged = self.store.purge_replaced_rejections()?;
        info!("Purged {purged} replaced participant rows");
        Ok(purged)
    }
}
