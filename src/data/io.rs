//! Dataset flat-file storage.
//!
//! The dataset is persisted as CSV with a header row matching the
//! [`TripRecord`] field names. Writes go through a temporary file and a
//! rename so a crashed writer never leaves a half-written dataset behind.

use std::fs;
use std::io;
use std::path::Path;

use crate::data::record::TripRecord;
use crate::persist::atomic_write;

/// Errors from reading or writing the dataset file.
#[derive(Debug, thiserror::Error)]
pub enum DatasetIoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset file contains no records")]
    Empty,
}

/// Write records as CSV (with header) to `path`, atomically.
pub fn write_dataset(path: impl AsRef<Path>, records: &[TripRecord]) -> Result<(), DatasetIoError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DatasetIoError::Io(e.into_error()))?;

    atomic_write(path.as_ref(), &bytes)?;
    Ok(())
}

/// Read all records from a CSV dataset file.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Vec<TripRecord>, DatasetIoError> {
    let file = fs::File::open(path.as_ref())?;
    let mut reader = csv::Reader::from_reader(file);

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }

    if records.is_empty() {
        return Err(DatasetIoError::Empty);
    }
    Ok(records)
}
