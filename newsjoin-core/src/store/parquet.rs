//! Parquet snapshot sink.
//!
//! Layout: `{dir}/{table}.parquet`, one file per table. Writes are atomic:
//! the frame goes to `{table}.parquet.tmp` first and is renamed into place,
//! so readers never observe a half-written table.

use super::{StoreError, TableSink};
use crate::domain::RefinedRow;
use crate::schema::{passthrough_columns, refined_schema, Cell, SchemaField, SchemaType};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub struct ParquetSink {
    dir: PathBuf,
}

impl ParquetSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a table is written to: `{dir}/{table}.parquet`.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.parquet"))
    }
}

impl TableSink for ParquetSink {
    fn replace_table(&mut self, table: &str, rows: &[RefinedRow]) -> Result<usize, StoreError> {
        fs::create_dir_all(&self.dir)?;

        let mut df = rows_to_dataframe(rows)?;
        let path = self.table_path(table);
        let tmp_path = path.with_extension("parquet.tmp");

        write_parquet(&mut df, &tmp_path)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::Io(e)
        })?;

        info!(path = %path.display(), rows = rows.len(), "wrote parquet snapshot");
        Ok(rows.len())
    }
}

// ── Frame building ──────────────────────────────────────────────────

fn date_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Convert refined rows to a frame with the refined schema's columns.
///
/// JSON passthrough columns are stored as their serialized text.
pub fn rows_to_dataframe(rows: &[RefinedRow]) -> Result<DataFrame, StoreError> {
    let fields = refined_schema(rows);
    let passthrough = passthrough_columns(rows);
    let cells: Vec<Vec<Cell<'_>>> = rows.iter().map(|r| r.cells(&passthrough)).collect();

    let columns = fields
        .iter()
        .enumerate()
        .map(|(i, field)| build_column(field, cells.iter().map(|row| row[i])))
        .collect::<Result<Vec<Column>, StoreError>>()?;

    DataFrame::new(columns).map_err(|e| StoreError::Parquet(format!("dataframe creation: {e}")))
}

fn build_column<'a>(
    field: &SchemaField,
    values: impl Iterator<Item = Cell<'a>>,
) -> Result<Column, StoreError> {
    let name = PlSmallStr::from(field.name.as_str());
    let mismatch = || StoreError::Parquet(format!("column '{}': cell type mismatch", field.name));

    let column = match field.dtype {
        SchemaType::Date => {
            let days = values
                .map(|c| match c {
                    Cell::Date(d) => Ok(date_days(d)),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<i32>, _>>()?;
            Column::new(name, days)
                .cast(&DataType::Date)
                .map_err(|e| StoreError::Parquet(format!("date cast: {e}")))?
        }
        SchemaType::Text => {
            let text = values
                .map(|c| match c {
                    Cell::Text(s) => Ok(s),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<Option<&str>>, _>>()?;
            Column::new(name, text)
        }
        SchemaType::Float64 => {
            let floats = values
                .map(|c| match c {
                    Cell::Float64(v) => Ok(v),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<Option<f64>>, _>>()?;
            Column::new(name, floats)
        }
        SchemaType::Int64 => {
            let ints = values
                .map(|c| match c {
                    Cell::Int64(v) => Ok(v),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<Option<i64>>, _>>()?;
            Column::new(name, ints)
        }
        SchemaType::Json => {
            let json = values
                .map(|c| match c {
                    Cell::Json(v) => Ok(v.map(|v| v.to_string())),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<Option<String>>, _>>()?;
            Column::new(name, json)
        }
    };
    Ok(column)
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), StoreError> {
    let file = fs::File::create(path)?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| StoreError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}
