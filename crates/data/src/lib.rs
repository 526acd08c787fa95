//! Data loading and storage for trader sentiment analysis.
//!
//! This crate provides:
//! - Raw CSV tables with normalized headers and duplicate removal
//! - Day-first and standard date parsing
//! - The `DataLoader` that turns the two raw sources into typed tables
//! - CSV export of the clustered daily table

pub mod csv_storage;
pub mod dates;
pub mod error;
pub mod loader;
pub mod raw_table;

pub use csv_storage::CsvStorage;
pub use error::InputError;
pub use loader::{DataLoader, SentimentTable, TradeTable};
pub use raw_table::RawTable;
