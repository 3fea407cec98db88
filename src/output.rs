//! Reading and writing record files.
//!
//! Records are stored as a pretty-printed JSON array (two-space indent,
//! non-ASCII kept as-is). A `.csv` extension selects CSV with a header row,
//! written even when there are no records.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{ListingItem, Record};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

impl OutputError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// On-disk record format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// Read a listing file produced by the harvester.
pub async fn read_listing(path: &Path) -> Result<Vec<ListingItem>, OutputError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| OutputError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode records in the given format.
pub fn encode_records<T: Record + Serialize>(
    records: &[T],
    format: OutputFormat,
) -> Result<Vec<u8>, OutputError> {
    match format {
        OutputFormat::Json => serde_json::to_vec_pretty(records).map_err(|source| {
            OutputError::Json {
                path: PathBuf::new(),
                source,
            }
        }),
        OutputFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Vec::new());
            writer.write_record(T::COLUMNS)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer
                .into_inner()
                .map_err(|e| OutputError::Csv(csv::Error::from(e.into_error())))
        }
    }
}

/// Write `records` to `path`, replacing any previous contents.
pub async fn write_records<T: Record + Serialize>(path: &Path, records: &[T]) -> Result<(), OutputError> {
    let format = OutputFormat::for_path(path);
    let bytes = encode_records(records, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| OutputError::io(parent, e))?;
    }
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|e| OutputError::io(path, e))?;

    debug!(
        "Wrote {} records ({} bytes, {:?}) to {}",
        records.len(),
        bytes.len(),
        format,
        path.display()
    );
    Ok(())
}
