//! Target event fields and per-row validation output

use serde::{Deserialize, Serialize};

/// The closed set of event fields a spreadsheet column may map onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventField {
    EventType,
    EventDate,
    EventTime,
    FileName,
    FileCount,
    FileDescription,
    FileType,
}

impl EventField {
    pub const ALL: [EventField; 7] = [
        EventField::EventType,
        EventField::EventDate,
        EventField::EventTime,
        EventField::FileName,
        EventField::FileCount,
        EventField::FileDescription,
        EventField::FileType,
    ];

    /// Parse a user-supplied target field name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "event_type" => Some(EventField::EventType),
            "event_date" => Some(EventField::EventDate),
            "event_time" => Some(EventField::EventTime),
            "file_name" => Some(EventField::FileName),
            "file_count" => Some(EventField::FileCount),
            "file_description" => Some(EventField::FileDescription),
            "file_type" => Some(EventField::FileType),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventField::EventType => "event_type",
            EventField::EventDate => "event_date",
            EventField::EventTime => "event_time",
            EventField::FileName => "file_name",
            EventField::FileCount => "file_count",
            EventField::FileDescription => "file_description",
            EventField::FileType => "file_type",
        }
    }
}

/// Timeline event category.
///
/// An unmapped or empty event type defaults to `Note` when the event is
/// built; a non-empty value outside this set is a validation error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Finding,
    Action,
    #[default]
    Note,
}

impl EventType {
    pub const ALL: [EventType; 3] = [EventType::Finding, EventType::Action, EventType::Note];

    /// Accepts the lowercase member names only
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "finding" => Some(EventType::Finding),
            "action" => Some(EventType::Action),
            "note" => Some(EventType::Note),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Finding => "finding",
            EventType::Action => "action",
            EventType::Note => "note",
        }
    }
}

/// Typed output of row validation; serializes to the field-name → value
/// object returned by the validate endpoint. Dates and times are
/// string-encoded ISO-8601.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// Validation result for a single spreadsheet row.
///
/// `row_number` is 1-based and stable across validate and confirm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedRow {
    pub row_number: usize,
    pub valid: bool,
    pub errors: Vec<String>,
    pub data: TransformedFields,
}
