// ===============================
// src/config.rs
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
use std::env;
use dotenvy::dotenv;

/// Kategori instrumen yang di-track secara default (kolom `type` upstream).
pub const DEFAULT_TRACKED_TYPES: &[&str] = &["ETF"];

/// Backend penyimpanan blob state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreMode {
    /// File lokal di bawah STATE_DIR
    Fs,
    /// In-memory, tidak persist apa pun (dry run)
    Mem,
}

impl StoreMode {
    pub fn from_env(key: &str, default_mode: StoreMode) -> StoreMode {
        match env::var(key).unwrap_or_default().to_ascii_lowercase().as_str() {
            "fs"  => StoreMode::Fs,
            "mem" => StoreMode::Mem,
            _ => default_mode,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Args {
    // upstream
    pub upstream_url: String,
    pub http_timeout_secs: u64,
    pub fetch_retries: u32,

    // storage
    pub store_mode: StoreMode,
    pub state_dir: String,
    pub state_key: String,
    pub changelog_key: String,

    // selector
    pub tracked_types: Vec<String>,
}

/// TRACKED_TYPES=ETF,ETN (comma separated); kosong -> default list
fn parse_tracked(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_string())
        .collect()
}

pub fn load() -> Args {
    // Pastikan .env dibaca (agar UPSTREAM_URL, STATE_DIR, dll ter-load)
    let _ = dotenv();

    // ===== Upstream =====
    let upstream_url = env::var("UPSTREAM_URL")
        .unwrap_or_else(|_| "http://localhost:8080/instruments.json".to_string());
    let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30);
    let fetch_retries = env::var("FETCH_RETRIES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);

    // ===== Storage =====
    let store_mode = StoreMode::from_env("STORE_MODE", StoreMode::Fs);
    let state_dir = env::var("STATE_DIR").unwrap_or_else(|_| "./state".to_string());
    let state_key = env::var("STATE_KEY").unwrap_or_else(|_| "instruments.json".to_string());
    let changelog_key =
        env::var("CHANGELOG_KEY").unwrap_or_else(|_| "changelog.html".to_string());

    // ===== Selector =====
    let tracked_types: Vec<String> = env::var("TRACKED_TYPES")
        .ok()
        .map(|s| parse_tracked(&s))
        .filter(|v: &Vec<String>| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_TRACKED_TYPES.iter().map(|s| s.to_string()).collect());

    Args {
        upstream_url,
        http_timeout_secs,
        fetch_retries,
        store_mode,
        state_dir,
        state_key,
        changelog_key,
        tracked_types,
    }
}
