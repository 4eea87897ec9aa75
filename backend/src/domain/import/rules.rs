//! Row validation. Every rule runs; each failure appends its fixed reason.

use super::sheet::ImportRow;
use crate::error::AppResult;
use crate::store::{ParticipantStore, RegionLookup};
use common::model::participant::ParticipantStatus;

const NAME_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ'.,-";
const DIGITS: &str = "1234567890";
const PHONE_CHARS: &str = "1234567890+";

fn has_char_outside(allowed: &str, value: &str) -> bool {
    value.chars().any(|c| !allowed.contains(c))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn len(value: &str) -> usize {
    value.chars().count()
}

pub struct RowValidator<'a> {
    participants: &'a dyn ParticipantStore,
    regions: &'a dyn RegionLookup,
}

impl<'a> RowValidator<'a> {
    pub fn new(participants: &'a dyn ParticipantStore, regions: &'a dyn RegionLookup) -> Self {
        RowValidator {
            participants,
            regions,
        }
    }

    /// Reasons the row cannot be imported, in rule order. Lookup failures
    /// are errors, not reasons.
    pub fn validate(&self, row: &ImportRow) -> AppResult<Vec<&'static str>> {
        let mut notes = Vec::new();

        if is_blank(&row.name) {
            notes.push("Nama Kosong \n");
        } else if has_char_outside(NAME_CHARS, &row.name.replace(' ', "")) {
            notes.push("Nama Tidak Sesuai Format \n");
        }

        self.check_nik(&row.nik, &mut notes)?;

        if is_blank(&row.gender) {
            notes.push("Jenis Kelamin Kosong \n");
        }
        check_phone(&row.phone, &mut notes);

        let ktp = &row.ktp;
        if is_blank(&ktp.address) {
            notes.push("Alamat Kosong \n");
        }
        check_code(&ktp.rt, "RT Kosong \n", "RT lebih dari 3 digit \n", &mut notes);
        check_code(&ktp.rw, "RW Kosong \n", "RW lebih dari 3 digit \n", &mut notes);
        self.check_province(
            &ktp.province,
            "Provinsi Kosong \n",
            "Provinsi tidak terdaftar \n",
            &mut notes,
        )?;
        self.check_regency(
            &ktp.regency,
            "Kota/Kabupaten Kosong \n",
            "Kota/Kabupaten tidak terdaftar \n",
            &mut notes,
        )?;
        if is_blank(&ktp.district) {
            notes.push("Kecamatan Kosong \n");
        }
        if is_blank(&ktp.village) {
            notes.push("Kelurahan Kosong \n");
        }
        if is_blank(&ktp.postal_code) {
            notes.push("Kode POS Kosong \n");
        }

        let residence = &row.residence;
        if is_blank(&residence.address) {
            notes.push("Alamat Domisili Kosong \n");
        }
        check_code(
            &residence.rt,
            "RT Domisili Kosong \n",
            "RT Domisili lebih dari 3 digit \n",
            &mut notes,
        );
        check_code(
            &residence.rw,
            "RW Domisili Kosong \n",
            "RW Domisili lebih dari 3 digit \n",
            &mut notes,
        );
        self.check_province(
            &residence.province,
            "Provinsi Domisili Kosong \n",
            "Provinsi Domisili tidak terdaftar \n",
            &mut notes,
        )?;
        self.check_regency(
            &residence.regency,
            "Kota/Kabupaten Domisili Kosong \n",
            "Kota/Kabupaten Domisili tidak terdaftar \n",
            &mut notes,
        )?;
        if is_blank(&residence.district) {
            notes.push("Domisili Kecamatan Kosong \n");
        }
        if is_blank(&residence.village) {
            notes.push("Domisili Kelurahan \n");
        }
        if is_blank(&residence.postal_code) {
            notes.push("Domisili Kode POS Kosong \n");
        }

        if is_blank(&row.status) {
            notes.push("Status Kosong \n");
        } else if ParticipantStatus::parse(&row.status).is_none() {
            notes.push("Status Tidak Sesuai Format \n");
        }

        Ok(notes)
    }

    fn check_nik(&self, nik: &str, notes: &mut Vec<&'static str>) -> AppResult<()> {
        if nik.is_empty() {
            notes.push("NIK Kosong \n");
        }
        if !nik.chars().any(|c| c.is_ascii_digit()) {
            notes.push("NIK terdapat karakter atau simbol karakter \n");
        } else if len(nik.trim_start_matches(' ')) != 16 {
            notes.push("NIK tidak 16 digit \n");
        } else {
            if has_char_outside(DIGITS, nik) {
                notes.push("NIK Tidak Sesuai Format \n");
            }
            if self.participants.nik_taken(nik, None)? {
                notes.push("NIK Sudah Terdaftar \n");
            }
        }
        Ok(())
    }

    fn check_province(
        &self,
        name: &str,
        empty: &'static str,
        unknown: &'static str,
        notes: &mut Vec<&'static str>,
    ) -> AppResult<()> {
        if is_blank(name) {
            notes.push(empty);
        } else if self
            .regions
            .find_province(&name.trim().to_uppercase())?
            .is_none()
        {
            notes.push(unknown);
        }
        Ok(())
    }

    fn check_regency(
        &self,
        name: &str,
        empty: &'static str,
        unknown: &'static str,
        notes: &mut Vec<&'static str>,
    ) -> AppResult<()> {
        if is_blank(name) {
            notes.push(empty);
        } else if self
            .regions
            .find_regency(&name.trim().to_uppercase())?
            .is_none()
        {
            notes.push(unknown);
        }
        Ok(())
    }
}

fn check_phone(phone: &str, notes: &mut Vec<&'static str>) {
    if is_blank(phone) {
        notes.push("No Handphone Kosong \n");
        return;
    }
    let length = len(phone);
    if length > 13 {
        notes.push("No Handphone lebih dari 13 digit \n");
    }
    if length < 10 {
        notes.push("No Handphone kurang dari 10 digit \n");
    }
    if (10..=13).contains(&length) && has_char_outside(PHONE_CHARS, phone) {
        notes.push("No Handphone Tidak Sesuai Format \n");
    }
}

/// RT and RW: required, at most three characters.
fn check_code(
    value: &str,
    empty: &'static str,
    too_long: &'static str,
    notes: &mut Vec<&'static str>,
) {
    if is_blank(value) {
        notes.push(empty);
    }
    if len(value) > 3 {
        notes.push(too_long);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::sheet::tests::valid_row;
    use crate::store::fixtures::{new_participant, seed_regions};
    use crate::store::Database;

    fn row(cells: [String; 21]) -> ImportRow {
        ImportRow {
            name: cells[0].clone(),
            nik: cells[1].clone(),
            gender: cells[2].clone(),
            phone: cells[3].clone(),
            ktp: common::model::participant::Address {
                address: cells[4].clone(),
                rt: cells[5].clone(),
                rw: cells[6].clone(),
                province: cells[7].clone(),
                regency: cells[8].clone(),
                district: cells[9].clone(),
                village: cells[10].clone(),
                postal_code: cells[11].clone(),
            },
            residence: common::model::participant::Address {
                address: cells[12].clone(),
                rt: cells[13].clone(),
                rw: cells[14].clone(),
                province: cells[15].clone(),
                regency: cells[16].clone(),
                district: cells[17].clone(),
                village: cells[18].clone(),
                postal_code: cells[19].clone(),
            },
            status: cells[20].clone(),
        }
    }

    fn notes_for(db: &Database, cells: [String; 21]) -> Vec<&'static str> {
        RowValidator::new(db, db).validate(&row(cells)).unwrap()
    }

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        seed_regions(&db);
        db
    }

    #[test]
    fn valid_row_has_no_notes() {
        let db = db();
        assert!(notes_for(&db, valid_row("Siti Aminah", "3201010101010001")).is_empty());
    }

    #[test]
    fn short_nik() {
        let db = db();
        let notes = notes_for(&db, valid_row("Budi", "12345"));
        assert_eq!(notes, vec!["NIK tidak 16 digit \n"]);
    }

    #[test]
    fn empty_nik_reports_both_rules() {
        let db = db();
        let notes = notes_for(&db, valid_row("Budi", ""));
        assert_eq!(
            notes,
            vec!["NIK Kosong \n", "NIK terdapat karakter atau simbol karakter \n"]
        );
    }

    #[test]
    fn sixteen_chars_with_letters() {
        let db = db();
        let notes = notes_for(&db, valid_row("Budi", "32010101010100AB"));
        assert_eq!(notes, vec!["NIK Tidak Sesuai Format \n"]);
    }

    #[test]
    fn registered_nik() {
        let db = db();
        db.create(&new_participant("3201010101010001")).unwrap();
        let notes = notes_for(&db, valid_row("Budi", "3201010101010001"));
        assert_eq!(notes, vec!["NIK Sudah Terdaftar \n"]);
    }

    #[test]
    fn phone_rules() {
        let db = db();
        let mut cells = valid_row("Budi", "3201010101010001");
        cells[3] = "abc1234567".into();
        assert_eq!(
            notes_for(&db, cells.clone()),
            vec!["No Handphone Tidak Sesuai Format \n"]
        );
        cells[3] = "0812".into();
        assert_eq!(
            notes_for(&db, cells.clone()),
            vec!["No Handphone kurang dari 10 digit \n"]
        );
        cells[3] = "+6281234567890".into();
        assert_eq!(
            notes_for(&db, cells),
            vec!["No Handphone lebih dari 13 digit \n"]
        );
    }

    #[test]
    fn name_with_digits() {
        let db = db();
        let notes = notes_for(&db, valid_row("Budi 2", "3201010101010001"));
        assert_eq!(notes, vec!["Nama Tidak Sesuai Format \n"]);
        let notes = notes_for(&db, valid_row("O'Neil, Jr.", "3201010101010001"));
        assert!(notes.is_empty());
    }

    #[test]
    fn rt_rw_and_regions_are_checked_per_block() {
        let db = db();
        let mut cells = valid_row("Budi", "3201010101010001");
        cells[5] = "0001".into();
        cells[14] = "".into();
        cells[8] = "Kota Atlantis".into();
        cells[18] = "".into();
        let notes = notes_for(&db, cells);
        assert_eq!(
            notes,
            vec![
                "RT lebih dari 3 digit \n",
                "Kota/Kabupaten tidak terdaftar \n",
                "RW Domisili Kosong \n",
                "Domisili Kelurahan \n",
            ]
        );
    }

    #[test]
    fn status_must_be_known() {
        let db = db();
        let mut cells = valid_row("Budi", "3201010101010001");
        cells[20] = "SELESAI".into();
        assert_eq!(notes_for(&db, cells.clone()), vec!["Status Tidak Sesuai Format \n"]);
        cells[20] = "".into();
        assert_eq!(notes_for(&db, cells), vec!["Status Kosong \n"]);
    }

    #[test]
    fn all_blank_collects_every_required_field() {
        let db = db();
        let notes = notes_for(&db, std::array::from_fn(|_| String::new()));
        assert!(notes.contains(&"Nama Kosong \n"));
        assert!(notes.contains(&"Kode POS Kosong \n"));
        assert!(notes.contains(&"Domisili Kode POS Kosong \n"));
        assert!(notes.contains(&"Status Kosong \n"));
        assert_eq!(notes.len(), 22);
    }
}
