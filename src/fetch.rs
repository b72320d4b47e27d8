// ===============================
// src/fetch.rs
// ===============================
//
// Upstream adapter: GET satu dokumen JSON berisi universe instrumen.
// - Transport error & HTTP 5xx di-retry terbatas (exponential backoff + jitter).
// - HTTP 4xx dan body non-JSON langsung fatal.
//
use rand::Rng;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("bad upstream url {url}: {source}")]
    BadUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("upstream body is not valid JSON: {0}")]
    BadBody(#[source] serde_json::Error),
}

/// Ambil snapshot dari upstream. `retries` = jumlah percobaan ulang
/// tambahan setelah percobaan pertama.
pub async fn fetch_snapshot(
    http: &reqwest::Client,
    url: &str,
    retries: u32,
) -> Result<Value, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::BadUrl {
        url: url.to_string(),
        source: e,
    })?;

    let mut attempt: u32 = 0;
    loop {
        match try_fetch(http, parsed.clone()).await {
            Ok(doc) => {
                info!(%url, attempt, "snapshot fetched");
                return Ok(doc);
            }
            Err(e) if attempt < retries && retryable(&e) => {
                warn!(%url, attempt, error = %e, "fetch failed, retrying");
            }
            Err(e) => return Err(e),
        }

        // Exponential backoff + jitter
        attempt = attempt.saturating_add(1);
        let shift = attempt.min(6);                  // 0..=6
        let factor = 1u64 << shift;                  // 1,2,4,...,64
        let base_ms = 500u64.saturating_mul(factor); // 0.5s..32s
        let jitter = rand::thread_rng().gen_range(0..=250);
        sleep(Duration::from_millis(base_ms + jitter)).await;
    }
}

fn retryable(e: &FetchError) -> bool {
    match e {
        FetchError::Transport(_) => true,
        FetchError::Status { status, .. } => status.is_server_error(),
        _ => false,
    }
}

async fn try_fetch(http: &reqwest::Client, url: Url) -> Result<Value, FetchError> {
    let rsp = http.get(url).send().await?;
    let status = rsp.status();
    if !status.is_success() {
        let body = rsp.text().await.unwrap_or_default();
        return Err(FetchError::Status { status, body });
    }
    let text = rsp.text().await?;
    serde_json::from_str(&text).map_err(FetchError::BadBody)
}
