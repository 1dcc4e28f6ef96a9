//! Row validation against a column mapping
//!
//! Pure functions: re-runnable with a different mapping without side
//! effects. Row-level failures are collected as error strings and never
//! abort the batch; a row with any error is simply excluded from the
//! confirm step.

use crate::models::{CellValue, EventField, EventType, TransformedFields, ValidatedRow};
use crate::services::parsers;

/// Validate and transform a single row.
///
/// Mapping pairs are processed in slice order, so error lists are
/// stable. Mapped columns are resolved by first-match name lookup in
/// `headers`; an unknown column records an error but does not abort the
/// row. Rows shorter than a resolved index read the missing cell as
/// null.
pub fn validate_row(
    row: &[CellValue],
    headers: &[String],
    mappings: &[(String, EventField)],
) -> (bool, TransformedFields, Vec<String>) {
    let mut data = TransformedFields::default();
    let mut errors: Vec<String> = Vec::new();

    for (col_name, field) in mappings {
        let Some(col_idx) = headers.iter().position(|h| h == col_name) else {
            errors.push(format!("Column '{}' not found in headers", col_name));
            continue;
        };

        // Short rows are tolerated, not rejected
        let raw = row.get(col_idx).unwrap_or(&CellValue::Null);

        match field {
            EventField::EventDate => match parsers::parse_date(raw) {
                Some(date) => data.event_date = Some(date.format("%Y-%m-%d").to_string()),
                None => errors.push(format!(
                    "Invalid date in column '{}': '{}'",
                    col_name,
                    raw.as_text()
                )),
            },

            // Time is optional: unparsable input leaves the field unset
            EventField::EventTime => {
                if let Some(time) = parsers::parse_time(raw) {
                    data.event_time = Some(time.format("%H:%M:%S").to_string());
                }
            }

            // Empty defers to the default applied at confirm
            EventField::EventType => match parsers::parse_event_type(raw) {
                Ok(Some(event_type)) => data.event_type = Some(event_type),
                Ok(None) => {}
                Err(_) => errors.push(format!(
                    "Invalid event type in column '{}': '{}'. Must be one of: action, finding, note",
                    col_name,
                    raw.as_text()
                )),
            },

            EventField::FileCount => match parsers::parse_int(raw) {
                Some(count) => data.file_count = Some(count),
                None => {
                    if !raw.is_blank() {
                        errors.push(format!(
                            "Invalid number in column '{}': '{}'",
                            col_name,
                            raw.as_text()
                        ));
                    }
                }
            },

            EventField::FileName | EventField::FileDescription | EventField::FileType => {
                let s = raw.as_text().trim().to_string();
                if !s.is_empty() {
                    match field {
                        EventField::FileName => data.file_name = Some(s),
                        EventField::FileDescription => data.file_description = Some(s),
                        EventField::FileType => data.file_type = Some(s),
                        _ => unreachable!(),
                    }
                }
            }
        }
    }

    // Catches both "no column mapped to event_date" and "mapped but unparsable"
    if data.event_date.is_none() {
        errors.push("Event date is required but missing or invalid".to_string());
    }

    let is_valid = errors.is_empty();
    (is_valid, data, errors)
}

/// Validate every row of a table, numbering rows from 1
pub fn validate_rows(
    rows: &[Vec<CellValue>],
    headers: &[String],
    mappings: &[(String, EventField)],
) -> Vec<ValidatedRow> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let (valid, data, errors) = validate_row(row, headers, mappings);
            ValidatedRow {
                row_number: i + 1,
                valid,
                errors,
                data,
            }
        })
        .collect()
}
