//! Output generation for cleaned listing datasets.
//!
//! The publisher reads the output file back for upload, so the writer only
//! reports success once the content is synced and atomically in place.

mod csv_writer;
mod error;

pub use csv_writer::{WrittenFile, render_csv, write_csv, write_dataset_csv};
pub use error::{OutputError, Result};
