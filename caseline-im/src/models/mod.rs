//! Data types for the import pipeline

pub mod cell;
pub mod fields;
pub mod import_session;

pub use cell::{CellValue, RawTable};
pub use fields::{EventField, EventType, TransformedFields, ValidatedRow};
pub use import_session::ImportSession;
