//! Upload ingestion
//!
//! Turns raw upload bytes into a `RawTable`. Format dispatch is by file
//! extension only; content sniffing is limited to text encoding and CSV
//! delimiter detection. All-blank rows are dropped in both paths so the
//! downstream phases never see them.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

use crate::models::{CellValue, RawTable};
use crate::services::normalize::normalize_sheet_cell;

/// Bytes of the upload prefix fed to encoding detection
const DETECT_PREFIX_BYTES: usize = 10_000;

/// Minimum detector confidence before trusting a non-UTF-8 guess
const DETECT_MIN_CONFIDENCE: f32 = 0.5;

/// Characters of decoded text examined for delimiter sniffing
const SNIFF_PREFIX_CHARS: usize = 5_000;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file type: .{0}. Use .csv or .xlsx")]
    UnsupportedFormat(String),

    #[error("File appears to be empty (no headers found)")]
    Empty,

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),
}

/// Parse an uploaded file into headers plus normalized rows
pub fn ingest(filename: &str, bytes: &[u8]) -> Result<RawTable, IngestError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => parse_csv(bytes),
        "xlsx" | "xls" => parse_spreadsheet(bytes),
        other => Err(IngestError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_csv(bytes: &[u8]) -> Result<RawTable, IngestError> {
    let text = decode_bytes(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let delimiter = sniff_delimiter(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|c| c.trim().to_string()).collect(),
        None => return Err(IngestError::Empty),
    };
    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::Empty);
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows.push(
            record
                .iter()
                .map(|c| CellValue::Text(c.to_string()))
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

fn parse_spreadsheet(bytes: &[u8]) -> Result<RawTable, IngestError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| IngestError::Spreadsheet(e.to_string()))?;

    // First sheet only
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestError::Empty)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Spreadsheet(e.to_string()))?;

    let mut iter = range.rows();

    let headers: Vec<String> = match iter.next() {
        Some(cells) => cells
            .iter()
            .enumerate()
            .map(|(i, c)| match c {
                Data::Empty => format!("Column_{}", i),
                other => {
                    let s = other.to_string().trim().to_string();
                    if s.is_empty() {
                        format!("Column_{}", i)
                    } else {
                        s
                    }
                }
            })
            .collect(),
        None => return Err(IngestError::Empty),
    };

    let mut rows = Vec::new();
    for cells in iter {
        let row: Vec<CellValue> = cells.iter().map(normalize_sheet_cell).collect();
        if row.iter().all(|c| c.is_blank()) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Decode upload bytes to text.
///
/// Detection runs over a bounded prefix; a guess below the confidence
/// floor falls back to lossy UTF-8.
fn decode_bytes(bytes: &[u8]) -> String {
    let prefix = &bytes[..bytes.len().min(DETECT_PREFIX_BYTES)];
    let (charset, confidence, _) = chardet::detect(prefix);

    let encoding = if confidence >= DETECT_MIN_CONFIDENCE {
        Encoding::for_label(chardet::charset2encoding(&charset).as_bytes()).unwrap_or(UTF_8)
    } else {
        UTF_8
    };

    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

/// Pick the candidate delimiter that appears most often in the prefix.
/// Ties and all-zero counts fall back to comma.
fn sniff_delimiter(text: &str) -> u8 {
    let prefix: String = text.chars().take(SNIFF_PREFIX_CHARS).collect();
    let mut best = b',';
    let mut best_count = 0;
    for &candidate in &CANDIDATE_DELIMITERS {
        let count = prefix.bytes().filter(|&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_csv() {
        let table = ingest("events.csv", b"Date,Type\n2025-01-15,finding\n").unwrap();
        assert_eq!(table.headers, vec!["Date", "Type"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(
            table.rows[0][0],
            CellValue::Text("2025-01-15".to_string())
        );
    }

    #[test]
    fn semicolon_delimiter_is_sniffed() {
        let table = ingest("e.csv", b"Date;Type\n2025-01-15;note\n2025-01-16;action\n").unwrap();
        assert_eq!(table.headers, vec!["Date", "Type"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][1], CellValue::Text("action".to_string()));
    }

    #[test]
    fn bom_is_stripped_from_first_header() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Date\n2025-01-15\n");
        let table = ingest("e.csv", &bytes).unwrap();
        assert_eq!(table.headers, vec!["Date"]);
    }

    #[test]
    fn latin1_bytes_decode() {
        // "café" in ISO-8859-1
        let bytes = b"Name\ncaf\xe9\n";
        let table = ingest("e.csv", bytes).unwrap();
        let CellValue::Text(s) = &table.rows[0][0] else {
            panic!("expected text cell");
        };
        assert!(s.starts_with("caf"), "got {:?}", s);
    }

    #[test]
    fn blank_rows_are_dropped() {
        let table = ingest("e.csv", b"Date,Type\n,,\n2025-01-15,note\n  ,  \n").unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn ragged_rows_are_kept_as_is() {
        let table = ingest("e.csv", b"A,B,C\n1,2\n1,2,3,4\n").unwrap();
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[1].len(), 4);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(ingest("e.csv", b""), Err(IngestError::Empty)));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = ingest("notes.pdf", b"x").unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(ref ext) if ext == "pdf"));
        assert_eq!(
            err.to_string(),
            "Unsupported file type: .pdf. Use .csv or .xlsx"
        );
    }

    #[test]
    fn no_extension_is_rejected() {
        assert!(matches!(
            ingest("README", b"x"),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }
}
