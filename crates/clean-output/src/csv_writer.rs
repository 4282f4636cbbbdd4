//! Row-oriented CSV serialization of a cleaned frame.
//!
//! One header row, then one line per record. Nulls are written as empty
//! fields, dates as `YYYY-MM-DD`, and every other value as its text.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{Terminator, WriterBuilder};
use polars::prelude::{AnyValue, Column, DataFrame};

use clean_ingest::any_to_string;

use crate::error::{OutputError, Result};

/// A CSV file that has been fully written and synced to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: u64,
}

/// Serialize `df` as CSV into `writer`.
pub fn write_csv<W: Write>(df: &DataFrame, writer: W) -> std::result::Result<W, csv::Error> {
    let mut csv_writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    let columns: Vec<&Column> = df.get_columns().iter().collect();
    let header: Vec<&str> = columns.iter().map(|column| column.name().as_str()).collect();
    csv_writer.write_record(&header)?;

    let mut record: Vec<String> = Vec::with_capacity(columns.len());
    for idx in 0..df.height() {
        record.clear();
        for column in &columns {
            record.push(any_to_string(column.get(idx).unwrap_or(AnyValue::Null)));
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    csv_writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

/// Render `df` to CSV bytes in memory.
pub fn render_csv(df: &DataFrame) -> std::result::Result<Vec<u8>, csv::Error> {
    write_csv(df, Vec::new())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write, sync, and stat the temp file. Returns its size in bytes.
fn write_temp_file(df: &DataFrame, temp_path: &Path) -> Result<u64> {
    let file = File::create(temp_path).map_err(|e| OutputError::Io {
        operation: "create",
        path: temp_path.to_path_buf(),
        source: e,
    })?;

    let file = write_csv(df, file).map_err(|e| OutputError::Csv {
        path: temp_path.to_path_buf(),
        source: e,
    })?;

    file.sync_all().map_err(|e| OutputError::Io {
        operation: "sync",
        path: temp_path.to_path_buf(),
        source: e,
    })?;
    let bytes = file
        .metadata()
        .map_err(|e| OutputError::Io {
            operation: "stat",
            path: temp_path.to_path_buf(),
            source: e,
        })?
        .len();
    Ok(bytes)
}

/// Write `df` to `path` durably.
///
/// The data goes to a sibling temp file which is synced to stable storage and
/// then renamed over `path`, so a reader never observes partial content. On
/// failure the temp file is removed.
pub fn write_dataset_csv(df: &DataFrame, path: &Path) -> Result<WrittenFile> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| OutputError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = temp_path_for(path);
    let committed = write_temp_file(df, &temp_path).and_then(|bytes| {
        fs::rename(&temp_path, path).map_err(|e| OutputError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source: e,
        })?;
        Ok(bytes)
    });
    let bytes = match committed {
        Ok(bytes) => bytes,
        Err(error) => {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %temp_path.display(),
                        error = %cleanup,
                        "failed to remove temp file"
                    );
                }
            }
            return Err(error);
        }
    };

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        bytes,
        "wrote dataset"
    );
    Ok(WrittenFile {
        path: path.to_path_buf(),
        rows: df.height(),
        bytes,
    })
}
