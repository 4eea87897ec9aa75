//! Reading beneficiary spreadsheets and writing the error workbook.

use crate::error::{AppError, AppResult};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use common::model::participant::Address;
use rust_xlsxwriter::Workbook;
use std::io::Cursor;

/// Data rows read at most from one file.
pub const MAX_DATA_ROWS: usize = 60_000;

pub const HEADERS: [&str; 21] = [
    "Nama",
    "NIK",
    "Jenis Kelamin",
    "No Handphone",
    "Alamat Sesuai KTP",
    "RT",
    "RW",
    "Provinsi",
    "Kota/Kabupaten",
    "Kecamatan",
    "Kelurahan",
    "Kode Pos",
    "Alamat Domisili",
    "RT Domisili",
    "RW Domisili",
    "Provinsi Domisili",
    "Kota/Kabupaten Domisili",
    "Kecamatan Domisili",
    "Kelurahan Domisili",
    "Kode Pos Domisili",
    "Status",
];

pub const NOTE_HEADER: &str = "Catatan";

/// One data row, values as read. Name and NIK are trimmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRow {
    pub name: String,
    pub nik: String,
    pub gender: String,
    pub phone: String,
    pub ktp: Address,
    pub residence: Address,
    pub status: String,
}

impl ImportRow {
    fn from_cells(mut cell: impl FnMut(usize) -> String) -> Self {
        let mut address = |start: usize| Address {
            address: cell(start),
            rt: cell(start + 1),
            rw: cell(start + 2),
            province: cell(start + 3),
            regency: cell(start + 4),
            district: cell(start + 5),
            village: cell(start + 6),
            postal_code: cell(start + 7),
        };
        let ktp = address(4);
        let residence = address(12);
        ImportRow {
            name: cell(0).trim().to_string(),
            nik: cell(1).trim().to_string(),
            gender: cell(2),
            phone: cell(3),
            ktp,
            residence,
            status: cell(20),
        }
    }

    /// End-of-data marker: name, NIK and gender all blank.
    pub fn is_end_marker(&self) -> bool {
        self.name.is_empty() && self.nik.trim().is_empty() && self.gender.trim().is_empty()
    }

    /// The values in column order.
    pub fn cells(&self) -> [&str; 21] {
        let (k, r) = (&self.ktp, &self.residence);
        [
            &self.name,
            &self.nik,
            &self.gender,
            &self.phone,
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
            &self.status,
        ]
    }
}

/// Reads the data rows of an `.xlsx` or `.csv` upload, stopping at the
/// first end-of-data marker.
pub fn read_rows(file_name: &str, bytes: &[u8]) -> AppResult<Vec<ImportRow>> {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".xlsx") {
        read_xlsx(bytes)
    } else if lower.ends_with(".csv") {
        read_csv(bytes)
    } else {
        Err(AppError::InvalidFile(
            "file must be an .xlsx or .csv spreadsheet".to_string(),
        ))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // Numeric cells holding NIKs and phone numbers must not gain a ".0".
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e16 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn collect_rows(mut row_at: impl FnMut(usize) -> ImportRow) -> Vec<ImportRow> {
    let mut rows = Vec::new();
    for index in 0..MAX_DATA_ROWS {
        let row = row_at(index);
        if row.is_end_marker() {
            break;
        }
        rows.push(row);
    }
    rows
}

fn read_xlsx(bytes: &[u8]) -> AppResult<Vec<ImportRow>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::InvalidFile(format!("cannot open workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::InvalidFile("workbook has no worksheet".to_string()))?
        .map_err(|e| AppError::InvalidFile(format!("cannot read worksheet: {e}")))?;

    // Row 0 is the header; positions are absolute so leading blank rows
    // do not shift the columns.
    Ok(collect_rows(|index| {
        let row = (index + 1) as u32;
        ImportRow::from_cells(|col| {
            range
                .get_value((row, col as u32))
                .map(cell_text)
                .unwrap_or_default()
        })
    }))
}

/// The most frequent of `, ; TAB |` in the header line.
fn detect_delimiter(header_line: &str) -> u8 {
    [b',', b';', b'\t', b'|']
        .into_iter()
        .max_by_key(|&d| header_line.matches(d as char).count())
        .unwrap_or(b',')
}

/// Text up to the first empty line after the header. An empty line inside a
/// quoted field does not count. The `csv` reader skips empty lines, so the
/// cut has to happen before parsing.
fn until_blank_line(text: &str) -> &str {
    let mut in_quotes = false;
    let mut offset = 0;
    for (index, line) in text.split_inclusive('\n').enumerate() {
        let content = line.trim_end_matches(['\r', '\n']);
        if index > 0 && !in_quotes && content.is_empty() {
            return &text[..offset];
        }
        if content.matches('"').count() % 2 == 1 {
            in_quotes = !in_quotes;
        }
        offset += line.len();
    }
    text
}

fn read_csv(bytes: &[u8]) -> AppResult<Vec<ImportRow>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|_| AppError::InvalidFile("CSV file is not valid UTF-8".to_string()))?;
    let header_line = text.lines().next().unwrap_or_default();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(header_line))
        .has_headers(true)
        .flexible(true)
        .from_reader(until_blank_line(text).as_bytes());

    // Records are parsed one at a time so nothing past the end marker is read.
    let mut rows = Vec::new();
    for record in reader.records().take(MAX_DATA_ROWS) {
        let record = record.map_err(|e| AppError::InvalidFile(format!("cannot read CSV: {e}")))?;
        let row = ImportRow::from_cells(|col| record.get(col).unwrap_or_default().to_string());
        if row.is_end_marker() {
            break;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// `Sheet1` with the 21 headers plus `Catatan`, one line per rejected row.
pub fn error_workbook(rows: &[(ImportRow, String)]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet().set_name("Sheet1")?;

    for (col, title) in HEADERS.iter().chain([&NOTE_HEADER]).enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }
    for (index, (row, note)) in rows.iter().enumerate() {
        let line = (index + 1) as u32;
        for (col, value) in row.cells().iter().enumerate() {
            sheet.write_string(line, col as u16, *value)?;
        }
        sheet.write_string(line, HEADERS.len() as u16, note)?;
    }

    Ok(workbook.save_to_buffer()?)
}
