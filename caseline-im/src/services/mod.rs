//! Import pipeline services
//!
//! Leaves first: `normalize` (cell-type collapse) and `parsers`
//! (per-field parsing) have no dependencies; `ingest` turns raw upload
//! bytes into a `RawTable`; `row_validator` applies a column mapping to
//! one row; `session_store` holds state between the three phases.

pub mod ingest;
pub mod normalize;
pub mod parsers;
pub mod row_validator;
pub mod session_store;

pub use ingest::{ingest, IngestError};
pub use session_store::ImportSessionStore;
