// ===============================
// src/validate.rs
// ===============================
//
// Schema validator untuk snapshot upstream:
// - Payload: { "data": [[ticker, shortName, longName, isinCode, type, ...], ...] }
// - Mapping posisi fix: 0=ticker, 1=shortName, 2=longName, 3=isinCode, 4=type.
//   Index > 4 diabaikan.
// - Validasi tidak mengubah bentuk row; downstream membangun view record
//   sendiri via `instrument_from_row`.
//
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::domain::Instrument;

// ISIN: 2 huruf negara, 9 alfanumerik, 1 check digit
static ISIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{9}[0-9]$").unwrap());

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("payload has no \"data\" member")]
    RowsMissing,
    #[error("\"data\" is not a list: {0}")]
    RowsNotAList(Value),
    #[error("\"data\" is empty")]
    RowsEmpty,
    #[error("row is not a list: {0}")]
    RowNotAList(Value),
    #[error("row has {len} fields, expected 5..=7: {row}")]
    RowArity { row: Value, len: usize },
    #[error("field {name} out of range or wrong type: {value}")]
    BadField { name: &'static str, value: Value },
    #[error("isinCode is not a valid ISIN: {0}")]
    BadIsin(Value),
}

/// Cek seluruh payload; sukses mengembalikan row asli yang sudah terbukti
/// well-formed, urutan dipertahankan.
pub fn validate_rows(doc: &Value) -> Result<Vec<Value>, ValidationError> {
    let rows = match doc.get("data") {
        None => return Err(ValidationError::RowsMissing),
        Some(Value::Array(rows)) => rows,
        Some(other) => return Err(ValidationError::RowsNotAList(other.clone())),
    };
    if rows.is_empty() {
        return Err(ValidationError::RowsEmpty);
    }
    for row in rows {
        check_row(row)?;
    }
    Ok(rows.clone())
}

fn check_row(row: &Value) -> Result<(), ValidationError> {
    let fields = row
        .as_array()
        .ok_or_else(|| ValidationError::RowNotAList(row.clone()))?;
    if fields.len() < 5 || fields.len() > 7 {
        return Err(ValidationError::RowArity { row: row.clone(), len: fields.len() });
    }
    check_str(&fields[0], "ticker", 1, 12)?;
    check_str(&fields[1], "shortName", 2, 24)?;
    check_str(&fields[2], "longName", 2, 64)?;
    check_isin(&fields[3])?;
    check_str(&fields[4], "type", 0, 24)?;
    Ok(())
}

fn check_str(v: &Value, name: &'static str, min: usize, max: usize) -> Result<(), ValidationError> {
    match v.as_str() {
        Some(s) if (min..=max).contains(&s.chars().count()) => Ok(()),
        _ => Err(ValidationError::BadField { name, value: v.clone() }),
    }
}

fn check_isin(v: &Value) -> Result<(), ValidationError> {
    match v.as_str() {
        Some(s) if ISIN_RE.is_match(s) => Ok(()),
        _ => Err(ValidationError::BadIsin(v.clone())),
    }
}

/// Bangun view record dari row yang sudah lolos `validate_rows`.
pub fn instrument_from_row(row: &Value) -> Instrument {
    let f = |i: usize| {
        row.get(i)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Instrument {
        ticker: f(0),
        short_name: f(1),
        long_name: f(2),
        isin_code: f(3),
        kind: f(4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(rows: Value) -> Value {
        json!({ "data": rows })
    }

    #[test]
    fn accepts_well_formed_rows() {
        let doc = payload(json!([
            ["NDA", "Nordea", "Nordea Bank Abp", "FI4000297767", "STOCK"],
            ["SPY", "SPDR S&P500", "SPDR S&P 500 ETF Trust", "US78462F1030", "ETF", "NYSE", "extra"],
        ]));
        let rows = validate_rows(&doc).unwrap();
        assert_eq!(rows.len(), 2);
        // index > 4 diabaikan oleh view record
        let ins = instrument_from_row(&rows[1]);
        assert_eq!(ins.ticker, "SPY");
        assert_eq!(ins.isin_code, "US78462F1030");
        assert_eq!(ins.kind, "ETF");
    }

    #[test]
    fn rejects_short_row() {
        let doc = payload(json!([["AB", "X"]]));
        match validate_rows(&doc) {
            Err(ValidationError::RowArity { len: 2, row }) => {
                assert_eq!(row, json!(["AB", "X"]));
            }
            other => panic!("expected RowArity, got {other:?}"),
        }
    }

    #[test]
    fn rejects_isin_starting_with_digits() {
        let doc = payload(json!([
            ["AB", "Short", "Long name", "12AB34567890", "ETF"],
        ]));
        match validate_rows(&doc) {
            Err(ValidationError::BadIsin(v)) => assert_eq!(v, json!("12AB34567890")),
            other => panic!("expected BadIsin, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_empty_or_non_list_data() {
        assert!(matches!(validate_rows(&json!({})), Err(ValidationError::RowsMissing)));
        assert!(matches!(
            validate_rows(&payload(json!([]))),
            Err(ValidationError::RowsEmpty)
        ));
        assert!(matches!(
            validate_rows(&json!({ "data": "oops" })),
            Err(ValidationError::RowsNotAList(_))
        ));
        assert!(matches!(
            validate_rows(&payload(json!(["not-a-row"]))),
            Err(ValidationError::RowNotAList(_))
        ));
    }

    #[test]
    fn rejects_field_constraint_violations() {
        // ticker > 12 chars
        let doc = payload(json!([
            ["WAYTOOLONGTICKER", "Short", "Long name", "FI4000297767", "ETF"],
        ]));
        assert!(matches!(
            validate_rows(&doc),
            Err(ValidationError::BadField { name: "ticker", .. })
        ));
        // shortName must be 2..=24
        let doc = payload(json!([["AB", "X", "Long name", "FI4000297767", "ETF"]]));
        assert!(matches!(
            validate_rows(&doc),
            Err(ValidationError::BadField { name: "shortName", .. })
        ));
        // type must be a string
        let doc = payload(json!([["AB", "Short", "Long name", "FI4000297767", 7]]));
        assert!(matches!(
            validate_rows(&doc),
            Err(ValidationError::BadField { name: "type", .. })
        ));
    }

    #[test]
    fn rejects_rows_with_too_many_fields() {
        let doc = payload(json!([
            ["AB", "Short", "Long name", "FI4000297767", "ETF", "x", "y", "z"],
        ]));
        assert!(matches!(
            validate_rows(&doc),
            Err(ValidationError::RowArity { len: 8, .. })
        ));
    }
}
