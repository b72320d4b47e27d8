// ===============================
// src/render.rs
// ===============================
//
// Changelog presenter: seluruh log (riwayat lama + record baru) diurutkan
// descending by dateTime, dirender ke satu dokumen HTML, lalu ditulis
// sebagai artifact lewat store. Dipanggil SETELAH state reconcile commit;
// gagal render tidak membatalkan state yang sudah tersimpan.
//
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::domain::{UpdateKind, UpdateRecord};
use crate::storage::{SnapshotStore, StorageError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Sort stable descending by dateTime; record dengan timestamp sama
/// mempertahankan urutan log.
pub fn presentation_order(mut updates: Vec<UpdateRecord>) -> Vec<UpdateRecord> {
    updates.sort_by(|a, b| b.date_time.cmp(&a.date_time));
    updates
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_changelog(updates: &[UpdateRecord], generated_at: DateTime<Utc>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Instrument changelog</title>\n</head>\n<body>\n");
    html.push_str("<h1>Instrument changelog</h1>\n");
    html.push_str(&format!(
        "<p>Generated at {}</p>\n",
        generated_at.to_rfc3339()
    ));

    if updates.is_empty() {
        html.push_str("<p>No changes recorded yet.</p>\n");
    } else {
        html.push_str("<table>\n<tr><th>Date</th><th>Change</th><th>Ticker</th><th>Name</th><th>ISIN</th><th>Type</th></tr>\n");
        for u in updates {
            let change = match u.kind {
                UpdateKind::Added => "added",
                UpdateKind::Removed => "removed",
            };
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                u.date_time.to_rfc3339(),
                change,
                escape(&u.instrument.ticker),
                escape(&u.instrument.long_name),
                escape(&u.instrument.isin_code),
                escape(&u.instrument.kind),
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Render + tulis artifact changelog.
pub async fn publish(
    store: &dyn SnapshotStore,
    key: &str,
    updates: Vec<UpdateRecord>,
    generated_at: DateTime<Utc>,
) -> Result<(), RenderError> {
    let ordered = presentation_order(updates);
    let html = render_changelog(&ordered, generated_at);
    store.write(key, html.as_bytes(), "text/html; charset=utf-8").await?;
    info!(%key, records = ordered.len(), "changelog published");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Instrument;
    use crate::storage::{MemStore, SnapshotStore};
    use chrono::TimeZone;

    fn record(kind: UpdateKind, isin: &str, ticker: &str, h: u32) -> UpdateRecord {
        UpdateRecord {
            kind,
            date_time: Utc.with_ymd_and_hms(2024, 1, 15, h, 0, 0).unwrap(),
            instrument: Instrument {
                ticker: ticker.to_string(),
                short_name: "Short".to_string(),
                long_name: "Long name".to_string(),
                isin_code: isin.to_string(),
                kind: "ETF".to_string(),
            },
        }
    }

    #[test]
    fn newest_records_render_first() {
        let updates = presentation_order(vec![
            record(UpdateKind::Added, "US0001", "OLD", 9),
            record(UpdateKind::Removed, "US0002", "NEW", 11),
        ]);
        let html = render_changelog(&updates, Utc::now());
        let newer = html.find("US0002").unwrap();
        let older = html.find("US0001").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn equal_timestamps_keep_log_order() {
        let updates = presentation_order(vec![
            record(UpdateKind::Removed, "US0001", "A", 10),
            record(UpdateKind::Added, "US0002", "B", 10),
        ]);
        assert_eq!(updates[0].instrument.isin_code, "US0001");
        assert_eq!(updates[1].instrument.isin_code, "US0002");
    }

    #[test]
    fn markup_in_fields_is_escaped() {
        let mut r = record(UpdateKind::Added, "US0001", "T", 10);
        r.instrument.long_name = "<b>Fund & Co</b>".to_string();
        let html = render_changelog(&[r], Utc::now());
        assert!(html.contains("&lt;b&gt;Fund &amp; Co&lt;/b&gt;"));
        assert!(!html.contains("<b>Fund"));
    }

    #[test]
    fn empty_log_renders_placeholder() {
        let html = render_changelog(&[], Utc::now());
        assert!(html.contains("No changes recorded yet."));
    }

    #[tokio::test]
    async fn publish_writes_the_artifact() {
        let store = MemStore::new();
        publish(&store, "changelog.html", vec![record(UpdateKind::Added, "US0001", "T", 10)], Utc::now())
            .await
            .unwrap();
        let html = String::from_utf8(store.read("changelog.html").await.unwrap()).unwrap();
        assert!(html.contains("US0001"));
        assert!(html.contains("added"));
    }
}
