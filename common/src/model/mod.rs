pub mod dashboard;
pub mod import_log;
pub mod organization;
pub mod participant;
pub mod quota;
pub mod region;
pub mod report;
pub mod user;
