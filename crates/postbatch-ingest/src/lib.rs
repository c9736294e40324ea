//! Submission file ingestion: raw spreadsheet or CSV content into a
//! canonical [`ParsedSubmission`](postbatch_core::ParsedSubmission).
//!
//! Loading bytes from storage is the caller's job; this crate only turns
//! text or workbook files into a [`Grid`] and a grid into validated rows.

pub mod error;
pub mod grid;
pub mod labels;
pub mod parse;
pub mod validate;

pub use error::IngestError;
pub use grid::{read_workbook, Grid, SourceFormat};
pub use parse::{parse_submission, DETAIL_HEADER_ROW};
pub use validate::{parse_price, validate_header, validate_row};
