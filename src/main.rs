// ===============================
// src/main.rs
// ===============================
/*
=============================================================================
Project : instrument_watch_rust — instrument list watcher & changelog in Rust
Module  : <module_name>.rs
Version : 0.2.0
Author  : Kukuh Tripamungkas Wicaksono (Kukuh TW)
Email   : kukuhtw@gmail.com
WhatsApp: https://wa.me/628129893706
LinkedIn: https://id.linkedin.com/in/kukuhtw
License : MIT (see LICENSE)

Summary : Fetches an instrument list snapshot from an upstream source,
          validates and filters it, reconciles additions/removals against
          the stored snapshot keyed by ISIN, appends them to a durable
          update log, and publishes an HTML changelog.

(c) 2025 Kukuh TW. All rights reserved where applicable.
=============================================================================
*/
mod config;
mod domain;
mod fetch;      // upstream snapshot (HTTP GET + retry)
mod validate;
mod selector;
mod storage;    // blob store adapter (fs/mem)
mod reconcile;  // core: diff by ISIN + update log
mod render;

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use crate::config::StoreMode;
use crate::domain::{Instrument, UpdateKind};
use crate::storage::{FsStore, MemStore, SnapshotStore};

#[derive(Debug, Error)]
enum RunError {
    #[error("http client build failed: {0}")]
    Client(#[source] reqwest::Error),
    #[error(transparent)]
    Fetch(#[from] fetch::FetchError),
    #[error(transparent)]
    Validation(#[from] validate::ValidationError),
    #[error(transparent)]
    Reconcile(#[from] reconcile::ReconcileError),
    #[error(transparent)]
    Render(#[from] render::RenderError),
}

/// Satu run end-to-end: fetch -> validate -> select -> reconcile -> publish.
/// State commit terjadi di reconcile; error setelah itu (render) tidak
/// membatalkan snapshot/log yang sudah tersimpan.
async fn run(args: &config::Args, store: &dyn SnapshotStore) -> Result<(), RunError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.http_timeout_secs))
        .build()
        .map_err(RunError::Client)?;

    let doc = fetch::fetch_snapshot(&http, &args.upstream_url, args.fetch_retries).await?;
    let rows = validate::validate_rows(&doc)?;
    info!(rows = rows.len(), "snapshot validated");

    let picked = selector::select(rows, &args.tracked_types);
    let instruments: Vec<Instrument> = picked.iter().map(validate::instrument_from_row).collect();
    info!(selected = instruments.len(), tracked = ?args.tracked_types, "instruments selected");

    let now = Utc::now();
    let outcome = reconcile::run(store, &args.state_key, instruments, now).await?;
    info!(
        added = outcome.appended.iter().filter(|u| u.kind == UpdateKind::Added).count(),
        removed = outcome.appended.iter().filter(|u| u.kind == UpdateKind::Removed).count(),
        "run reconciled"
    );

    render::publish(store, &args.changelog_key, outcome.state.updates, now).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // ---- Logging ----
    tracing_subscriber::fmt().with_env_filter("info").init();

    // ---- Load config ----
    let args = config::load();

    let store_mode_str = match args.store_mode {
        StoreMode::Fs => "fs",
        StoreMode::Mem => "mem",
    };
    info!(
        upstream = %args.upstream_url,
        store_mode = %store_mode_str,
        state_dir = %args.state_dir,
        state_key = %args.state_key,
        changelog_key = %args.changelog_key,
        tracked = ?args.tracked_types,
        "startup config"
    );

    // ---- Store ----
    let store: Box<dyn SnapshotStore> = match args.store_mode {
        StoreMode::Fs => Box::new(FsStore::new(&args.state_dir)),
        StoreMode::Mem => Box::new(MemStore::new()),
    };

    // ---- Run once ----
    if let Err(e) = run(&args, store.as_ref()).await {
        error!(error = %e, "run aborted");
        std::process::exit(1);
    }
    info!("run complete");
}
