//! Dataset Module - Training Data Store
//!
//! Append-only CSV file holding raw sensor readings plus an optional
//! supplied label. All writers share the canonical header in `record.rs`.

pub mod record;
pub mod writer;


pub use record::{SensorRecord, CANONICAL_HEADER};
pub use writer::{CsvStore, StoreError};
