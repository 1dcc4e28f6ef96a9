//! Per-field value parsers
//!
//! Every parser is total: it accepts any normalized cell value and
//! returns `None` on unparsable input instead of failing. Fallback
//! format lists are tried in fixed priority order, first match wins.
//!
//! Normalization collapses typed date/time cells to ISO-8601 strings,
//! so "accepts an already-typed temporal value" is realized here as a
//! leading ISO datetime parse attempt ahead of the fallback formats.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{CellValue, EventType};

/// Collapsed ISO datetime form produced by the cell normalizer
/// (`%.f` also matches an absent fractional part)
const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

const TIME_FORMATS: [&str; 4] = ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p"];

/// Parse a cell into a calendar date
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    let text = value.as_text();
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, ISO_DATETIME_FORMAT) {
        return Some(dt.date());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a cell into a time of day
pub fn parse_time(value: &CellValue) -> Option<NaiveTime> {
    let text = value.as_text();
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, ISO_DATETIME_FORMAT) {
        return Some(dt.time());
    }

    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

/// Parse a cell into an integer. Floats truncate toward zero, so does
/// the string form: `"3.9"` → 3.
pub fn parse_int(value: &CellValue) -> Option<i64> {
    match value {
        CellValue::Int(i) => Some(*i),
        CellValue::Float(f) => truncate_to_i64(*f),
        CellValue::Null => None,
        CellValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().and_then(truncate_to_i64)
        }
    }
}

/// Parse a cell into an event type, case-insensitively. `Ok(None)` for
/// blank input, which defers to the default applied at event creation;
/// `Err` carries the offending text.
pub fn parse_event_type(value: &CellValue) -> Result<Option<EventType>, String> {
    let text = value.as_text();
    let s = text.trim().to_lowercase();
    if s.is_empty() {
        return Ok(None);
    }
    EventType::parse(&s)
        .map(Some)
        .ok_or_else(|| text.trim().to_string())
}

fn truncate_to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}
