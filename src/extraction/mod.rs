//! Table extraction module
//!
//! This module turns a rendered stats table into ordered, fixed-schema
//! records: layout variants, the record model, DOM helpers and the row
//! extractor.

pub mod dom;
pub mod layout;
pub mod record;
pub mod rows;

pub use layout::{ColumnSource, ColumnSpec, NameLink, PaginationVocabulary, TableLayout};
pub use record::{PlayerRecord, RecordSchema};
pub use rows::RowExtractor;
