#![warn(clippy::all)]

mod api;
mod config;
mod error;
mod models;
mod monitoring;
mod pool;
mod storage;
#[cfg(test)]
mod testutil;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{info, warn};

use crate::api::AppState;
use crate::config::Config;
use crate::error::AppError;
use crate::monitoring::{HttpChecker, MonitorScheduler, validation};
use crate::pool::LibsqlManager;
use crate::storage::{MemoryStore, SqliteStore, Store};
use logger::init_tracing;

/// Uptime monitor: periodic HTTP(S) checks with a small status API.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    init_tracing();

    let args = Args::parse();
    let config = Config::from_config(args.config.as_deref())?;
    info!("{config}");

    let store = open_store(&config).await?;
    register_configured_websites(store.as_ref(), &config).await;

    let checker =
        Arc::new(HttpChecker::new(Duration::from_secs(config.monitoring.timeout_seconds))?);

    let scheduler = Arc::new(MonitorScheduler::new(
        Arc::clone(&store),
        Arc::clone(&checker),
        Duration::from_secs(config.monitoring.interval_seconds),
        config.monitoring.overlap_ticks,
    ));
    tokio::spawn(scheduler.run());

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    run_server(addr, store, checker).await
}

async fn open_store(config: &Config) -> Result<Arc<dyn Store>, AppError> {
    match &config.storage.db_path {
        Some(path) => {
            info!(path = %path.display(), "opening database");
            let database =
                libsql::Builder::new_local(path).build().await.map_err(anyhow::Error::from)?;
            let pool = deadpool::managed::Pool::builder(LibsqlManager::new(database))
                .build()
                .map_err(anyhow::Error::from)?;
            Ok(Arc::new(SqliteStore::new(pool).await?))
        }
        None => {
            info!("no database path configured, using the in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn register_configured_websites(store: &dyn Store, config: &Config) {
    for entry in &config.websites {
        if let Err(error) = validation::validate_website_url(&entry.url) {
            warn!(url = %entry.url, %error, "skipping invalid website");
            continue;
        }

        match store.register_website(&entry.name, &entry.url).await {
            Ok(website) => info!(id = website.id, url = %website.url, "registered website"),
            Err(error) => warn!(url = %entry.url, %error, "failed to register website"),
        }
    }
}

async fn run_server(
    addr: SocketAddr,
    store: Arc<dyn Store>,
    checker: Arc<HttpChecker>,
) -> Result<(), AppError> {
    info!(%addr, "starting web server");

    let state = web::Data::new(AppState { store, checker });
    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}
