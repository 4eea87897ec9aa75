//! Printable hand-over reports of beneficiaries who received their aid.

use crate::error::{AppError, AppResult};
use crate::storage::Storage;
use crate::store::{non_blank, AddressScope, Page, ParticipantFilter, ParticipantStore};
use chrono::Utc;
use common::model::participant::{Participant, ParticipantStatus};
use common::model::report::{ExportedReport, ReportFile};
use common::requests::ReportRequest;
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::style::Style;
use genpdf::{Document, Element as _, SimplePageDecorator};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// One file worth of report rows.
pub struct ReportPage<'a> {
    pub request: &'a ReportRequest,
    pub participants: &'a [Participant],
    /// Rows across all files.
    pub total: usize,
    /// Position of the first row of this page, zero-based.
    pub offset: usize,
}

pub trait ReportRenderer: Send + Sync {
    fn render(&self, page: &ReportPage<'_>) -> AppResult<Vec<u8>>;
}

/// Records that participants appeared on a printed report. Returns the id
/// of the background job doing it, if one could be queued.
pub trait PrintBookkeeping: Send + Sync {
    fn mark_printed(&self, ids: Vec<i64>) -> Option<String>;
}

fn printed_state(value: &str) -> Option<bool> {
    match value.trim().to_uppercase().as_str() {
        "PRINTED" => Some(true),
        "NOT PRINTED" => Some(false),
        _ => None,
    }
}

#[derive(Clone)]
pub struct ReportExporter {
    participants: Arc<dyn ParticipantStore>,
    storage: Arc<dyn Storage>,
    renderer: Arc<dyn ReportRenderer>,
    bookkeeping: Arc<dyn PrintBookkeeping>,
    rows_per_file: usize,
}

impl ReportExporter {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        storage: Arc<dyn Storage>,
        renderer: Arc<dyn ReportRenderer>,
        bookkeeping: Arc<dyn PrintBookkeeping>,
        rows_per_file: usize,
    ) -> Self {
        ReportExporter {
            participants,
            storage,
            renderer,
            bookkeeping,
            rows_per_file: rows_per_file.max(1),
        }
    }

    /// Renders the matching `DONE` participants into one PDF per
    /// `rows_per_file` rows. Marking them printed happens in the background.
    pub fn export(&self, request: &ReportRequest) -> AppResult<ExportedReport> {
        let filter = ParticipantFilter {
            scope: AddressScope::Residence,
            province: non_blank(&request.province),
            regency: non_blank(&request.regency),
            kind: non_blank(&request.kind),
            status: Some(ParticipantStatus::Done),
            has_printed: printed_state(&request.has_printed),
            ..ParticipantFilter::default()
        };
        // Everything is read up front: marking rows printed must not shift
        // later pages of a NOT PRINTED report.
        let participants = self.participants.list(&filter, Page::all())?;
        let stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();

        let mut report = ExportedReport {
            files: Vec::new(),
            print_jobs: Vec::new(),
        };
        for (part, chunk) in participants.chunks(self.rows_per_file).enumerate() {
            let pdf = self.renderer.render(&ReportPage {
                request,
                participants: chunk,
                total: participants.len(),
                offset: part * self.rows_per_file,
            })?;
            let name = format!("{stamp}-report-{}.pdf", part + 1);
            let key = self.storage.save(&name, &pdf)?;
            report.files.push(ReportFile {
                name,
                path: self.storage.url(&key),
            });

            let ids = chunk.iter().map(|p| p.id).collect();
            if let Some(job_id) = self.bookkeeping.mark_printed(ids) {
                report.print_jobs.push(job_id);
            }
        }

        info!(
            "Report exported: {} participants in {} files",
            participants.len(),
            report.files.len()
        );
        Ok(report)
    }
}

/// Renders reports with genpdf using a TTF family loaded from disk.
pub struct GenPdfRenderer {
    fonts_dir: PathBuf,
    font_family: String,
}

impl GenPdfRenderer {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: impl Into<String>) -> Self {
        GenPdfRenderer {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.into(),
        }
    }

    fn document(&self) -> AppResult<Document> {
        let family = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None)
            .map_err(|e| {
                AppError::Internal(format!(
                    "cannot load font family {} from {}: {e}",
                    self.font_family,
                    self.fonts_dir.display()
                ))
            })?;
        let mut doc = Document::new(family);
        doc.set_title("Laporan Penyaluran Bantuan");
        doc.set_font_size(9);
        doc.set_line_spacing(1.0);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }
}

fn pdf_error(err: genpdf::error::Error) -> AppError {
    AppError::Internal(format!("PDF rendering failed: {err}"))
}

fn push_notes(doc: &mut Document, title: &str, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    doc.push(Paragraph::new(title).styled(Style::new().bold()));
    for line in text.lines() {
        doc.push(Paragraph::new(line));
    }
    doc.push(Break::new(1));
}

impl ReportRenderer for GenPdfRenderer {
    fn render(&self, page: &ReportPage<'_>) -> AppResult<Vec<u8>> {
        let mut doc = self.document()?;
        let request = page.request;

        doc.push(
            Paragraph::new("LAPORAN PENYALURAN BANTUAN")
                .styled(Style::new().bold().with_font_size(14)),
        );
        doc.push(Break::new(1));
        doc.push(Paragraph::new(format!("Provinsi       : {}", request.province)));
        doc.push(Paragraph::new(format!("Kota/Kabupaten : {}", request.regency)));
        doc.push(Paragraph::new(format!("Tanggal        : {}", request.date)));
        doc.push(Paragraph::new(format!("Total penerima : {}", page.total)));
        doc.push(Break::new(1));

        push_notes(&mut doc, "Waktu", &request.time_note);
        push_notes(&mut doc, "Evaluasi", &request.evaluation);
        push_notes(&mut doc, "Solusi", &request.solution);

        let mut table = TableLayout::new(vec![1, 4, 4, 6, 3, 3]);
        table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
        let bold = Style::new().bold();
        table
            .row()
            .element(Paragraph::new("No").styled(bold))
            .element(Paragraph::new("Nama").styled(bold))
            .element(Paragraph::new("NIK").styled(bold))
            .element(Paragraph::new("Alamat Domisili").styled(bold))
            .element(Paragraph::new("Kecamatan").styled(bold))
            .element(Paragraph::new("Kelurahan").styled(bold))
            .push()
            .map_err(pdf_error)?;

        for (index, p) in page.participants.iter().enumerate() {
            let r = &p.residence;
            table
                .row()
                .element(Paragraph::new((page.offset + index + 1).to_string()))
                .element(Paragraph::new(p.name.as_str()))
                .element(Paragraph::new(p.nik.as_str()))
                .element(Paragraph::new(format!(
                    "{} RT {} / RW {}",
                    r.address, r.rt, r.rw
                )))
                .element(Paragraph::new(r.district.as_str()))
                .element(Paragraph::new(r.village.as_str()))
                .push()
                .map_err(pdf_error)?;
        }
        doc.push(table);

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use crate::store::fixtures::new_participant;
    use crate::store::Database;
    use std::sync::Mutex;

    /// Writes the rendered row ids instead of a PDF.
    struct IdsRenderer;

    impl ReportRenderer for IdsRenderer {
        fn render(&self, page: &ReportPage<'_>) -> AppResult<Vec<u8>> {
            let ids: Vec<String> = page.participants.iter().map(|p| p.id.to_string()).collect();
            Ok(ids.join(",").into_bytes())
        }
    }

    #[derive(Default)]
    struct RecordedPrints(Mutex<Vec<Vec<i64>>>);

    impl PrintBookkeeping for RecordedPrints {
        fn mark_printed(&self, ids: Vec<i64>) -> Option<String> {
            let mut batches = self.0.lock().unwrap();
            batches.push(ids);
            Some(format!("job-{}", batches.len()))
        }
    }

    fn seed_done(db: &Database, count: usize) {
        for i in 0..count {
            let mut p = new_participant(&format!("32010101010100{i:02}"));
            p.status = ParticipantStatus::Done;
            db.create(&p).unwrap();
        }
        db.create(&new_participant("3201010101019999")).unwrap();
    }

    #[test]
    fn splits_done_participants_into_files() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        seed_done(&db, 5);
        let storage = Arc::new(LocalStorage::new(dir.path(), "image").unwrap());
        let prints = Arc::new(RecordedPrints::default());
        let exporter = ReportExporter::new(
            Arc::new(db.clone()),
            storage.clone(),
            Arc::new(IdsRenderer),
            prints.clone(),
            2,
        );

        let report = exporter.export(&ReportRequest::default()).unwrap();

        assert_eq!(report.files.len(), 3);
        assert_eq!(report.print_jobs, vec!["job-1", "job-2", "job-3"]);
        assert!(report.files[2].name.ends_with("-report-3.pdf"));
        let last = storage
            .read(report.files[2].path.strip_prefix("image/").unwrap())
            .unwrap();
        assert_eq!(String::from_utf8(last).unwrap(), "5");
        let batches = prints.0.lock().unwrap();
        assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 5);
    }

    #[test]
    fn printed_filter_skips_marked_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        seed_done(&db, 3);
        db.mark_printed(&[1, 2]).unwrap();
        let exporter = ReportExporter::new(
            Arc::new(db.clone()),
            Arc::new(LocalStorage::new(dir.path(), "image").unwrap()),
            Arc::new(IdsRenderer),
            Arc::new(RecordedPrints::default()),
            500,
        );

        let request = ReportRequest {
            has_printed: "not printed".into(),
            ..ReportRequest::default()
        };
        let report = exporter.export(&request).unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.print_jobs.len(), 1);
    }

    #[test]
    fn missing_fonts_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = GenPdfRenderer::new(dir.path(), "LiberationSans");
        let request = ReportRequest::default();
        let err = renderer
            .render(&ReportPage {
                request: &request,
                participants: &[],
                total: 0,
                offset: 0,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
