//! Append-only CSV sink shared by concurrent extraction workers.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use csv::{Writer, WriterBuilder};
use tracing::{debug, instrument};

use crate::model::{ArticleRecord, CSV_HEADER};

/// Errors raised while opening or writing the CSV output.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The output file could not be opened or inspected.
    #[error("cannot open CSV output {path}: {source}")]
    Open {
        /// Output path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A row could not be written or flushed.
    #[error("cannot write CSV output {path}: {source}")]
    Write {
        /// Output path.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A worker panicked while holding the writer.
    #[error("CSV writer for {path} is poisoned")]
    Poisoned {
        /// Output path.
        path: PathBuf,
    },
}

/// CSV file opened in append mode; rows are serialized through a mutex.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    writer: Mutex<Writer<File>>,
}

impl CsvSink {
    /// Opens (or creates) `path` for appending.
    ///
    /// The header row is written only when the file is empty, so rerunning
    /// against an existing file keeps a single header.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the file cannot be opened or the header cannot be written.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let open_err = |source: std::io::Error| SinkError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;
        let is_empty = file.metadata().map_err(open_err)?.len() == 0;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        let write_err = |source: csv::Error| SinkError::Write {
            path: path.to_path_buf(),
            source,
        };
        if is_empty {
            debug!("writing CSV header");
            writer.write_record(CSV_HEADER).map_err(write_err)?;
            writer.flush().map_err(|e| write_err(e.into()))?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
        })
    }

    /// Output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the row cannot be written or flushed.
    pub fn append(&self, record: &ArticleRecord) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned {
            path: self.path.clone(),
        })?;
        writer.serialize(record).map_err(|source| SinkError::Write {
            path: self.path.clone(),
            source,
        })?;
        writer.flush().map_err(|e| SinkError::Write {
            path: self.path.clone(),
            source: e.into(),
        })
    }
}
