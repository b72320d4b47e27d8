// ===============================
// src/domain.rs
// ===============================
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Satu instrumen dari universe upstream. `isin_code` adalah business key
/// unik; field lain boleh berubah tanpa mengubah identitas instrumen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub ticker: String,
    #[serde(rename = "shortName")]
    pub short_name: String,
    #[serde(rename = "longName")]
    pub long_name: String,
    #[serde(rename = "isinCode")]
    pub isin_code: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind { Added, Removed }

/// Satu event perubahan pada log. Immutable setelah dibuat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    #[serde(rename = "dateTime")]
    pub date_time: DateTime<Utc>,
    pub instrument: Instrument,
}

/// Blob state yang dipersist: snapshot terakhir + seluruh riwayat update.
/// `instruments` ascending by ISIN tanpa duplikat; `updates` oldest-first,
/// append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub instruments: Vec<Instrument>,
    pub updates: Vec<UpdateRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Wire format harus round-trip persis: camelCase keys, "type" untuk
    // kind, dateTime RFC3339 dengan suffix Z.
    #[test]
    fn persisted_state_wire_format_roundtrips() {
        let raw = r#"{"instruments":[{"ticker":"NDA","shortName":"Nordea","longName":"Nordea Bank Abp","isinCode":"FI4000297767","type":"STOCK"}],"updates":[{"type":"added","dateTime":"2024-01-15T10:00:00Z","instrument":{"ticker":"NDA","shortName":"Nordea","longName":"Nordea Bank Abp","isinCode":"FI4000297767","type":"STOCK"}}]}"#;
        let state: PersistedState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.instruments[0].isin_code, "FI4000297767");
        assert_eq!(state.updates[0].kind, UpdateKind::Added);
        let out = serde_json::to_string(&state).unwrap();
        assert_eq!(out, raw);
    }
}
