//! releasehub - upload backend for artist releases
//!
//! Artists create a release container with cover art, attach audio tracks
//! one at a time, and submit the release for review.

mod api;
mod config;
mod core;
mod db;
mod error;
mod models;
mod state;
mod storage;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::config::{BlobBackend, Paths, Settings};
use crate::db::Database;
use crate::state::AppState;

/// releasehub - music release upload server
#[derive(Parser, Debug)]
#[command(name = "releasehub")]
#[command(version)]
#[command(about = "Upload backend for artist releases")]
struct Args {
    /// Host address to bind to (overrides settings)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides settings)
    #[arg(long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Path to config directory
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("{},sqlx=warn", log_level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("releasehub v{} starting...", env!("CARGO_PKG_VERSION"));

    let paths = Paths::init(args.config)?;
    info!("Config directory: {:?}", paths.config_dir());

    let mut settings = Settings::load(&paths)?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }

    run(settings).await
}

async fn run(settings: Settings) -> Result<()> {
    info!("Opening database...");
    let db = Database::connect(settings.database_url()).await?;

    let blobs = storage::from_settings(&settings.blob).context("Invalid blob storage settings")?;
    let media_dir = match settings.blob.backend {
        BlobBackend::Local => settings.blob.local_dir.clone(),
        BlobBackend::Http => None,
    };

    info!("Starting release processor...");
    core::processor::spawn_release_processor(
        db.clone(),
        Duration::from_secs(settings.processing_delay_secs),
        Duration::from_secs(settings.processing_sweep_secs.max(1)),
    );

    let addr = format!("{}:{}", settings.host, settings.port);
    let cors_origins = settings.cors_origins.clone();
    let state = web::Data::new(AppState::new(db.clone(), blobs, settings));

    info!("Server listening on http://{}", addr);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        if cors_origins.is_empty() {
            cors = cors.allow_any_origin();
        }
        for origin in &cors_origins {
            cors = cors.allowed_origin(origin);
        }

        let media_dir = media_dir.clone();

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(api::configure)
            .configure(move |cfg| {
                if let Some(dir) = media_dir {
                    cfg.service(actix_files::Files::new("/media", dir));
                }
            })
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {}", addr))?
    .run()
    .await?;

    db.close().await;
    Ok(())
}
