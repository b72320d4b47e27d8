// ===============================
// src/selector.rs
// ===============================
use serde_json::Value;

/// Saring row tervalidasi: hanya kategori (index 4) yang ada di allow-list.
/// Urutan dipertahankan, tanpa dedup (dedup ISIN urusan reconcile).
pub fn select(rows: Vec<Value>, tracked: &[String]) -> Vec<Value> {
    rows.into_iter()
        .filter(|row| {
            row.get(4)
                .and_then(Value::as_str)
                .map(|kind| tracked.iter().any(|t| t == kind))
                .unwrap_or(false)
        })
        .collect()
}
