//! Normalized cell values
//!
//! Every cell that enters an import session is one of four JSON-safe
//! shapes. Native spreadsheet types (dates, times, booleans, formulas)
//! are collapsed at ingestion time by the normalizer, so nothing
//! dynamically typed ever reaches the row validator.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A normalized, JSON-transmissible cell value.
///
/// Temporal values appear as their ISO-8601 string form; a float with
/// zero fractional part appears as `Int`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Empty cell
    Null,
    /// Integer (including floats that collapsed to whole numbers)
    Int(i64),
    /// Floating-point with a non-zero fractional part
    Float(f64),
    /// Everything else, stringified
    Text(String),
}

impl CellValue {
    /// True when the cell carries no usable content
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// String form consumed by the field parsers ("" for null)
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            CellValue::Text(s) => Cow::Borrowed(s),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
        }
    }
}

/// Ephemeral result of file ingestion.
///
/// Every row has the same declared column count as `headers` at parse
/// time, but consumers must tolerate shorter rows (missing trailing
/// cells read as null). Duplicate header names are preserved; column
/// position is the authoritative key, resolved first-match by name.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}
