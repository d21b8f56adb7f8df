//! Loader for station-level price panels stored as Parquet or CSV.

use crate::analyzers::types::RawObservation;
use crate::error::{PassThroughError, Result};
use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use polars::prelude::{DataType, ParquetReader, SerReader};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Reads the configured `columns` of every row in the dataset at `path`.
///
/// Paths ending in `.parquet` are read as Parquet. Anything else is CSV, and
/// paths ending in `.gz` are decompressed on the fly. Other columns in the
/// file are ignored.
///
/// # Errors
///
/// - [`PassThroughError::DatasetNotFound`] if `path` is not a file.
/// - [`PassThroughError::MissingColumn`] if a configured column is not in the
///   header.
/// - [`PassThroughError::Csv`] on malformed CSV.
/// - [`PassThroughError::Parquet`] on an unreadable Parquet file.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_observations(
    path: impl AsRef<Path>,
    columns: &[String],
) -> Result<Vec<RawObservation>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PassThroughError::DatasetNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let extension = path.extension().and_then(|e| e.to_str());
    debug!(?extension, "Opening dataset");

    let observations = match extension {
        Some("parquet") => read_parquet_observations(file, columns)?,
        Some("gz") => read_observations(GzDecoder::new(file), columns)?,
        _ => read_observations(file, columns)?,
    };
    info!(rows = observations.len(), "Dataset loaded");
    Ok(observations)
}

/// Reads a Parquet file, keeping only `columns`.
///
/// Every column is cast to text so typed Parquet columns (dates, floats) fill
/// the same cells a CSV row would. Nulls leave the cell absent.
pub fn read_parquet_observations(file: File, columns: &[String]) -> Result<Vec<RawObservation>> {
    let df = ParquetReader::new(file).finish()?;
    debug!(rows = df.height(), width = df.width(), "Parquet dataset read");

    let mut observations = vec![RawObservation::new(); df.height()];
    for column in columns {
        let values = df
            .column(column)
            .map_err(|_| PassThroughError::MissingColumn(column.clone()))?
            .cast(&DataType::String)?;

        for (obs, cell) in observations.iter_mut().zip(values.str()?) {
            if let Some(cell) = cell {
                obs.insert(column.as_str(), cell);
            }
        }
    }

    Ok(observations)
}

/// Parses CSV from any reader, keeping only `columns`.
pub fn read_observations<R: Read>(reader: R, columns: &[String]) -> Result<Vec<RawObservation>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header_map: HashMap<String, usize> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.to_string(), idx))
        .collect();
    debug!(headers = ?header_map.keys().collect::<Vec<_>>(), "Dataset columns");

    let mut selected = Vec::with_capacity(columns.len());
    for column in columns {
        let idx = header_map
            .get(column)
            .ok_or_else(|| PassThroughError::MissingColumn(column.clone()))?;
        selected.push((column.as_str(), *idx));
    }

    let mut observations = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut obs = RawObservation::new();
        for (column, idx) in &selected {
            // Short rows leave trailing columns absent.
            if let Some(cell) = record.get(*idx) {
                obs.insert(*column, cell);
            }
        }
        observations.push(obs);
    }

    Ok(observations)
}
