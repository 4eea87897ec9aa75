//! Business operations. Everything here is synchronous; HTTP handlers run
//! it on the blocking pool.

pub mod dashboard;
pub mod export;
pub mod import;
pub mod report;
pub mod transition;
pub mod users;
