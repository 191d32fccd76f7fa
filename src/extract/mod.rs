//! Concurrent metadata extraction into a CSV sink.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use crawler_core::extract::CsvSink;
//!
//! let sink = Arc::new(CsvSink::open(Path::new("output_metadata.csv"))?);
//! println!("appending to {}", sink.path().display());
//! # Ok::<(), crawler_core::extract::SinkError>(())
//! ```

mod scheduler;
mod sink;

pub use scheduler::{DEFAULT_WORKERS, ExtractionScheduler, MAX_WORKERS, MIN_WORKERS};
pub use sink::{CsvSink, SinkError};

/// Errors that abort an extraction batch.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The CSV sink rejected a row.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The worker semaphore was closed unexpectedly.
    #[error("worker semaphore closed")]
    SemaphoreClosed,
}
