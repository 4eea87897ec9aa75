//! Everything a request handler needs, wired once at startup and shared as
//! `web::Data<AppState>`.

use crate::auth::TokenIssuer;
use crate::config::Settings;
use crate::domain::dashboard::Dashboard;
use crate::domain::export::Exporter;
use crate::domain::import::BulkImporter;
use crate::domain::report::{GenPdfRenderer, ReportExporter, ReportRenderer};
use crate::domain::transition::StatusTransitions;
use crate::domain::users::Accounts;
use crate::job_controller::queue::TaskQueue;
use crate::storage::Storage;
use crate::store::{Database, ImportLogStore, ParticipantStore, RegionLookup};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub participants: Arc<dyn ParticipantStore>,
    pub import_logs: Arc<dyn ImportLogStore>,
    pub regions: Arc<dyn RegionLookup>,
    pub storage: Arc<dyn Storage>,
    pub transitions: StatusTransitions,
    pub importer: BulkImporter,
    pub dashboard: Dashboard,
    pub exporter: Exporter,
    pub reports: ReportExporter,
    pub accounts: Accounts,
}

impl AppState {
    pub fn new(
        db: Database,
        storage: Arc<dyn Storage>,
        queue: TaskQueue,
        settings: &Settings,
    ) -> Self {
        let renderer = Arc::new(GenPdfRenderer::new(
            settings.report.fonts_dir.clone(),
            settings.report.font_family.clone(),
        ));
        Self::with_renderer(db, storage, queue, renderer, settings)
    }

    pub fn with_renderer(
        db: Database,
        storage: Arc<dyn Storage>,
        queue: TaskQueue,
        renderer: Arc<dyn ReportRenderer>,
        settings: &Settings,
    ) -> Self {
        let db = Arc::new(db);
        let queue = Arc::new(queue);
        AppState {
            participants: db.clone(),
            import_logs: db.clone(),
            regions: db.clone(),
            storage: storage.clone(),
            transitions: StatusTransitions::new(db.clone()),
            importer: BulkImporter::new(db.clone(), db.clone(), db.clone(), storage.clone()),
            dashboard: Dashboard::new(db.clone(), db.clone()),
            exporter: Exporter::new(
                db.clone(),
                storage.clone(),
                queue.clone(),
                Duration::from_secs(settings.export.ttl_secs),
            ),
            reports: ReportExporter::new(
                db.clone(),
                storage,
                renderer,
                queue,
                settings.report.rows_per_file,
            ),
            accounts: Accounts::new(
                db,
                TokenIssuer::new(&settings.auth.jwt_secret, settings.auth.token_ttl_hours),
            ),
        }
    }
}
