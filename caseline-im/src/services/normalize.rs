//! Cell normalization
//!
//! Collapses native spreadsheet cell types into the `CellValue` set.
//! Total and deterministic: every input maps to exactly one output and
//! nothing here can fail.

use calamine::Data;
use chrono::{NaiveDateTime, NaiveTime};

use crate::models::CellValue;

/// Normalize one spreadsheet cell.
///
/// Temporal cells become their ISO-8601 textual form, floats with a
/// zero fractional part become integers, booleans and error cells are
/// stringified, empty cells become null.
pub fn normalize_sheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => normalize_float(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => normalize_datetime(naive),
            // Serial value the date conversion could not represent
            None => normalize_float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// A datetime at exactly midnight collapses to its date-only ISO form,
/// so pure date cells read back as `YYYY-MM-DD`.
pub fn normalize_datetime(dt: NaiveDateTime) -> CellValue {
    if dt.time() == NaiveTime::MIN {
        CellValue::Text(dt.date().format("%Y-%m-%d").to_string())
    } else {
        CellValue::Text(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

/// A float numerically equal to its truncation becomes an integer
pub fn normalize_float(f: f64) -> CellValue {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        CellValue::Int(f as i64)
    } else {
        CellValue::Float(f)
    }
}
