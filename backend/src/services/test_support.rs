use crate::config::Settings;
use crate::domain::report::{ReportPage, ReportRenderer};
use crate::error::AppResult;
use crate::job_controller::queue::{BackgroundTask, TaskQueue};
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::state::AppState;
use crate::storage::LocalStorage;
use crate::store::Database;
use actix_web::web;
use std::sync::Arc;
use tokio::sync::mpsc;

struct StubRenderer;

impl ReportRenderer for StubRenderer {
    fn render(&self, page: &ReportPage<'_>) -> AppResult<Vec<u8>> {
        Ok(format!("%PDF rows={}", page.participants.len()).into_bytes())
    }
}

/// Application state over an in-memory database. Background tasks are
/// queued but never run.
pub(crate) struct TestContext {
    pub db: Database,
    pub state: AppState,
    pub jobs: JobsState,
    pub tasks: mpsc::Receiver<BackgroundTask>,
    _job_updates: mpsc::Receiver<JobUpdate>,
    _dir: tempfile::TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path(), "image").unwrap());
        let (task_tx, tasks) = mpsc::channel(64);
        let (jobs_tx, job_updates) = mpsc::channel(64);
        let state = AppState::with_renderer(
            db.clone(),
            storage,
            TaskQueue::new(task_tx, jobs_tx.clone()),
            Arc::new(StubRenderer),
            &Settings::default(),
        );
        TestContext {
            db,
            state,
            jobs: JobsState::new(jobs_tx),
            tasks,
            _job_updates: job_updates,
            _dir: dir,
        }
    }

    pub fn state_data(&self) -> web::Data<AppState> {
        web::Data::new(self.state.clone())
    }

    pub fn jobs_data(&self) -> web::Data<JobsState> {
        web::Data::new(self.jobs.clone())
    }

    /// Number of files currently in the storage directory.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self._dir.path()).unwrap().count()
    }
}

/// Builds the full `/api/v1` service over a [`TestContext`].
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state_data())
                .app_data($ctx.jobs_data())
                .service(crate::services::configure_routes()),
        )
        .await
    };
}

pub(crate) use test_app;

/// Hand-built `multipart/form-data` body.
pub(crate) struct MultipartBody {
    boundary: &'static str,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        MultipartBody {
            boundary: "----bansos-test-boundary",
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (self.content_type(), self.body)
    }
}
