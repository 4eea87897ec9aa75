//! Work that runs outside the request/response cycle.
//!
//! - `state`: the job status map, written only by `start_job_updater` from
//!   `JobUpdate` messages and read by `GET /jobs/{job_id}`.
//! - `queue`: the bounded `BackgroundTask` queue and its worker, which marks
//!   reported participants as printed and removes expired exports.

pub mod queue;
pub mod state;
