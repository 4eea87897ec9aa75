mod auth;
mod config;
mod domain;
mod error;
mod job_controller;
mod response;
mod services;
mod state;
mod storage;
mod store;

use crate::config::Settings;
use crate::job_controller::queue::{start_task_worker, TaskQueue};
use crate::job_controller::state::{start_job_updater, JobsState};
use crate::state::AppState;
use crate::storage::LocalStorage;
use crate::store::Database;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let settings = Settings::load().map_err(io::Error::other)?;
    env_logger::init_from_env(Env::default().default_filter_or(settings.log_level.0.as_str()));

    let db = Database::open(&settings.database.path).map_err(io::Error::other)?;
    let storage = Arc::new(
        LocalStorage::new(&settings.storage.root, settings.storage.public_prefix.clone())
            .map_err(io::Error::other)?,
    );

    // Job status map, updated only through its channel.
    let (jobs_tx, jobs_rx) = mpsc::channel(100);
    let jobs_state = JobsState::new(jobs_tx);
    tokio::spawn(start_job_updater(jobs_state.clone(), jobs_rx));

    let (task_tx, task_rx) = mpsc::channel(100);
    tokio::spawn(start_task_worker(
        task_rx,
        Arc::new(db.clone()),
        storage.clone(),
        jobs_state.tx.clone(),
    ));

    let queue = TaskQueue::new(task_tx, jobs_state.tx.clone());
    let app_state = AppState::new(db, storage, queue, &settings);

    let (host, port) = (settings.server.host.clone(), settings.server.port);
    info!("Server running at http://{host}:{port}");

    let json_limit = settings.server.json_limit;
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(jobs_state.clone()))
            .service(services::configure_routes())
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
