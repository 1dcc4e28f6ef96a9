//! Database operations for caseline-im

pub mod cases;
pub mod events;

pub use events::{bulk_insert, EventDraft};
