//! Shared state of background jobs.
//!
//! Workers never write the map directly: they push a [`JobUpdate`] through
//! `JobsState.tx` and `start_job_updater` applies it. Handlers only read.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

#[derive(Clone)]
pub struct JobsState {
    /// Job id to its latest status.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    pub fn new(tx: mpsc::Sender<JobUpdate>) -> Self {
        JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        }
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobUpdate {
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        JobUpdate {
            job_id: job_id.into(),
            status,
        }
    }
}

/// Applies updates until every sender is dropped. Spawned once from `main`.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn updater_records_latest_status() {
        let (tx, rx) = mpsc::channel(4);
        // The updater's copy must not keep the channel it drains alive.
        let (unused_tx, _unused_rx) = mpsc::channel(1);
        let state = JobsState::new(unused_tx);
        let updater = tokio::spawn(start_job_updater(state.clone(), rx));

        tx.send(JobUpdate::new("job-1", JobStatus::Pending)).await.unwrap();
        tx.send(JobUpdate::new("job-1", JobStatus::Completed("3".into())))
            .await
            .unwrap();
        drop(tx);
        updater.await.unwrap();

        assert_eq!(
            state.status("job-1").await,
            Some(JobStatus::Completed("3".into()))
        );
        assert_eq!(state.status("job-2").await, None);
    }
}
