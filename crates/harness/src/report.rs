//! CSV report writer
//!
//! Append-only: the header is written once when the file is created, every
//! case becomes one complete row flushed immediately, so a run that dies
//! midway still leaves a well-formed partial report.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::MrResult;
use crate::runner::CaseResult;

pub const CSV_COLUMNS: [&str; 5] = [
    "original_text",
    "transformed_text",
    "original_prediction",
    "transformed_prediction",
    "result",
];

pub struct CsvReporter {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvReporter {
    /// Open `path` for appending, writing the header if the file is new.
    pub fn open(path: &Path) -> MrResult<Self> {
        let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if is_new {
            writer.write_record(CSV_COLUMNS)?;
            writer.flush()?;
        }

        Ok(Self { writer, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one result row and flush it.
    pub fn append(&mut self, result: &CaseResult) -> MrResult<()> {
        self.writer.write_record([
            result.original_text.as_str(),
            result.transformed_text.as_str(),
            result.original_prediction.as_deref().unwrap_or(""),
            result.transformed_prediction.as_deref().unwrap_or(""),
            if result.passed { "pass" } else { "fail" },
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}
