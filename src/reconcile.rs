// ===============================
// src/reconcile.rs
// ===============================
//
// Reconciliation engine:
// - Bootstrap  : belum ada blob state -> simpan snapshot awal, log kosong.
// - Reconcile  : baca state lama, diff by ISIN terhadap snapshot baru,
//                append record removed/added ke log, ganti snapshot,
//                tulis balik satu blob utuh.
// - Diff hanya melihat `isin_code`; perubahan field lain pada ISIN yang sama
//   tidak menghasilkan record, nilai barunya yang dipertahankan.
//
use std::cmp::Ordering;

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::domain::{Instrument, PersistedState, UpdateKind, UpdateRecord};
use crate::storage::{SnapshotStore, StorageError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("persisted state {key} is not decodable: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("persisted state is not encodable: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Hasil satu run: record yang baru ditambahkan run ini (bukan seluruh log)
/// plus state lengkap yang sudah dipersist.
#[derive(Debug)]
pub struct Outcome {
    pub appended: Vec<UpdateRecord>,
    pub state: PersistedState,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Diff {
    pub added: Vec<Instrument>,
    pub removed: Vec<Instrument>,
}

/// Dedup by ISIN (keep first occurrence) lalu sort ascending by ISIN.
pub fn normalize(mut list: Vec<Instrument>) -> Vec<Instrument> {
    let mut seen = AHashSet::new();
    list.retain(|ins| seen.insert(ins.isin_code.clone()));
    list.sort_by(|a, b| a.isin_code.cmp(&b.isin_code));
    list
}

/// Symmetric difference keyed by ISIN, linear merge atas dua sequence yang
/// sudah tersortir by ISIN. ISIN yang ada di keduanya tidak menghasilkan
/// apa-apa.
pub fn diff(prior: &[Instrument], next: &[Instrument]) -> Diff {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);

    while i < prior.len() && j < next.len() {
        match prior[i].isin_code.cmp(&next[j].isin_code) {
            Ordering::Less => {
                removed.push(prior[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                added.push(next[j].clone());
                j += 1;
            }
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    removed.extend_from_slice(&prior[i..]);
    added.extend_from_slice(&next[j..]);

    Diff { added, removed }
}

/// Satu run reconciliation terhadap blob `key`. Semua record run ini
/// di-stamp dengan `now` yang sama.
pub async fn run(
    store: &dyn SnapshotStore,
    key: &str,
    selected: Vec<Instrument>,
    now: DateTime<Utc>,
) -> Result<Outcome, ReconcileError> {
    let next = normalize(selected);

    if !store.exists(key).await? {
        // Bootstrap: tidak ada pembanding, run ini tidak menghasilkan record
        let state = PersistedState { instruments: next, updates: Vec::new() };
        commit(store, key, &state).await?;
        info!(instruments = state.instruments.len(), %key, "bootstrap snapshot stored");
        return Ok(Outcome { appended: Vec::new(), state });
    }

    let bytes = store.read(key).await?;
    let mut state: PersistedState =
        serde_json::from_slice(&bytes).map_err(|e| ReconcileError::Decode {
            key: key.to_string(),
            source: e,
        })?;

    // Blob dipercaya, tapi urutannya tidak diasumsikan
    state.instruments.sort_by(|a, b| a.isin_code.cmp(&b.isin_code));

    let d = diff(&state.instruments, &next);
    let mut appended = Vec::with_capacity(d.removed.len() + d.added.len());
    for instrument in d.removed {
        appended.push(UpdateRecord { kind: UpdateKind::Removed, date_time: now, instrument });
    }
    for instrument in d.added {
        appended.push(UpdateRecord { kind: UpdateKind::Added, date_time: now, instrument });
    }

    state.instruments = next;
    state.updates.extend(appended.iter().cloned());
    commit(store, key, &state).await?;

    info!(
        added = appended.iter().filter(|u| u.kind == UpdateKind::Added).count(),
        removed = appended.iter().filter(|u| u.kind == UpdateKind::Removed).count(),
        log_len = state.updates.len(),
        %key,
        "reconciliation committed"
    );
    Ok(Outcome { appended, state })
}

async fn commit(
    store: &dyn SnapshotStore,
    key: &str,
    state: &PersistedState,
) -> Result<(), ReconcileError> {
    let bytes = serde_json::to_vec(state).map_err(ReconcileError::Encode)?;
    store.write(key, &bytes, "application/json").await?;
    Ok(())
}
