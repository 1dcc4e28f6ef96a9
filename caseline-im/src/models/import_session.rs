//! Import session state
//!
//! One session bridges the three phases of a single import:
//! upload (creates it) → validate (attaches mapping + row results)
//! → confirm (consumes and deletes it). A session never outlives an
//! explicit confirm, TTL expiry, or a process restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CellValue, EventField, RawTable, ValidatedRow};

/// Ephemeral server-side state for one spreadsheet import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSession {
    /// Opaque unique token returned to the client at upload
    pub session_id: Uuid,

    /// Case this import targets
    pub case_id: Uuid,

    /// User who uploaded the file; validate/confirm must match
    pub owner_user_id: Uuid,

    /// Original upload filename
    pub filename: String,

    /// Trimmed header row (duplicates preserved, position authoritative)
    pub headers: Vec<String>,

    /// Normalized data rows (all-blank rows already dropped)
    pub rows: Vec<Vec<CellValue>>,

    /// Column → field mapping in caller order, present once validate
    /// has run
    pub mappings: Option<Vec<(String, EventField)>>,

    /// Per-row validation output, present once validate has run
    pub validated_rows: Option<Vec<ValidatedRow>>,

    /// Creation instant, used for TTL expiry
    pub created_at: DateTime<Utc>,
}

impl ImportSession {
    /// Create a fresh session from an ingested table
    pub fn new(case_id: Uuid, owner_user_id: Uuid, filename: String, table: RawTable) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            case_id,
            owner_user_id,
            filename,
            headers: table.headers,
            rows: table.rows,
            mappings: None,
            validated_rows: None,
            created_at: Utc::now(),
        }
    }

    /// Attach (or replace) validation results.
    ///
    /// Re-running validate fully replaces the prior mapping and row
    /// results; nothing is merged.
    pub fn attach_validation(
        &mut self,
        mappings: Vec<(String, EventField)>,
        validated_rows: Vec<ValidatedRow>,
    ) {
        self.mappings = Some(mappings);
        self.validated_rows = Some(validated_rows);
    }

    /// True once validate has run at least once
    pub fn is_validated(&self) -> bool {
        self.validated_rows.is_some()
    }
}
