//! Submission processing: inbox scanning, per-row publishing with scoped
//! image exposure, run logs and file routing.
//!
//! The [`Processor`] is written against the traits in [`ports`]; [`local`]
//! provides filesystem-backed implementations for running on one machine.

pub mod error;
pub mod exposure;
pub mod local;
pub mod ports;
pub mod processor;
pub mod publisher;
pub mod reader;
pub mod results;

#[cfg(test)]
mod fakes;

pub use error::{ExposureError, FileError, PublishError, StoreError};
pub use exposure::{ExposureHandle, ExposureManager};
pub use local::{CsvRunLogWriter, LocalFileStore, LocalSheets};
pub use ports::{FileStore, RunLogWriter, SheetEngine, Sharing, StoredFile};
pub use processor::{FileReport, InboxReport, Processor, ProcessorOptions, RESULTS_FOLDER};
pub use results::{LogEntry, RunRecorder, RunSummary};
