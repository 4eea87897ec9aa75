//! Bounded queue of follow-up work that must not hold up a response:
//! flagging reported participants as printed and removing expired exports.

use super::state::JobUpdate;
use crate::domain::export::ExpirySchedule;
use crate::domain::report::PrintBookkeeping;
use crate::storage::Storage;
use crate::store::ParticipantStore;
use common::jobs::JobStatus;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundTask {
    MarkPrinted { job_id: String, ids: Vec<i64> },
    ExpireFile { key: String, after: Duration },
}

/// Producer side, usable from blocking code.
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::Sender<BackgroundTask>,
    jobs: mpsc::Sender<JobUpdate>,
}

impl TaskQueue {
    pub fn new(tx: mpsc::Sender<BackgroundTask>, jobs: mpsc::Sender<JobUpdate>) -> Self {
        TaskQueue { tx, jobs }
    }

    fn enqueue(&self, task: BackgroundTask) -> bool {
        match self.tx.try_send(task) {
            Ok(()) => true,
            Err(e) => {
                error!("Background task dropped: {e}");
                false
            }
        }
    }
}

impl PrintBookkeeping for TaskQueue {
    fn mark_printed(&self, ids: Vec<i64>) -> Option<String> {
        let job_id = uuid::Uuid::new_v4().to_string();
        // The permit holds the slot, so the job is registered only when the
        // task is sure to be queued, and before the worker can report on it.
        let permit = match self.tx.try_reserve() {
            Ok(permit) => permit,
            Err(e) => {
                error!("Background task dropped: {e}");
                return None;
            }
        };
        if let Err(e) = self
            .jobs
            .try_send(JobUpdate::new(job_id.clone(), JobStatus::Pending))
        {
            error!("Could not register job {job_id}: {e}");
        }
        permit.send(BackgroundTask::MarkPrinted {
            job_id: job_id.clone(),
            ids,
        });
        Some(job_id)
    }
}

impl ExpirySchedule for TaskQueue {
    fn expire(&self, key: &str, after: Duration) {
        self.enqueue(BackgroundTask::ExpireFile {
            key: key.to_string(),
            after,
        });
    }
}

async fn report(jobs: &mpsc::Sender<JobUpdate>, job_id: &str, status: JobStatus) {
    if let Err(e) = jobs.send(JobUpdate::new(job_id, status)).await {
        error!("Job {job_id}: status update lost: {e}");
    }
}

async fn mark_printed(
    participants: Arc<dyn ParticipantStore>,
    jobs: &mpsc::Sender<JobUpdate>,
    job_id: String,
    ids: Vec<i64>,
) {
    report(jobs, &job_id, JobStatus::InProgress(0)).await;
    let count = ids.len();
    let outcome = tokio::task::spawn_blocking(move || participants.mark_printed(&ids)).await;
    let status = match outcome {
        Ok(Ok(updated)) => {
            info!("Job {job_id}: marked {updated} of {count} participants as printed");
            JobStatus::Completed(updated.to_string())
        }
        Ok(Err(e)) => {
            error!("Job {job_id}: marking participants printed failed: {e}");
            JobStatus::Failed(e.to_string())
        }
        Err(e) => {
            error!("Job {job_id}: worker panicked: {e}");
            JobStatus::Failed(e.to_string())
        }
    };
    report(jobs, &job_id, status).await;
}

fn schedule_expiry(storage: Arc<dyn Storage>, key: String, after: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        let removed = tokio::task::spawn_blocking({
            let key = key.clone();
            move || storage.delete(&key)
        })
        .await;
        match removed {
            Ok(Ok(())) => info!("Expired export {key} removed"),
            Ok(Err(e)) => error!("Removing expired export {key} failed: {e}"),
            Err(e) => error!("Removing expired export {key} panicked: {e}"),
        }
    });
}

/// Consumes tasks until every [`TaskQueue`] is dropped. Print jobs run one
/// at a time; each expiry waits on its own timer.
pub async fn start_task_worker(
    mut rx: mpsc::Receiver<BackgroundTask>,
    participants: Arc<dyn ParticipantStore>,
    storage: Arc<dyn Storage>,
    jobs: mpsc::Sender<JobUpdate>,
) {
    while let Some(task) = rx.recv().await {
        match task {
            BackgroundTask::MarkPrinted { job_id, ids } => {
                mark_printed(participants.clone(), &jobs, job_id, ids).await
            }
            BackgroundTask::ExpireFile { key, after } => {
                schedule_expiry(storage.clone(), key, after)
            }
        }
    }
}
