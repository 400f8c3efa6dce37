//! CSV loaders for underlying bars and prefetched premiums.
//!
//! The bar file is the usual daily export with columns
//! `Date, Open, High, Low, Close, Volume` (extra columns such as
//! `Adj Close` are ignored). Dates may be `yyyy-mm-dd` or `m/d/yy`.

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{DailyBar, OptionKind, OptionRequest};
use super::PremiumTable;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::FileNotFound(path.display().to_string()));
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn parse_date(s: &str) -> Result<NaiveDate, LoaderError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%y"))
        .map_err(|_| LoaderError::InvalidData(format!("unparseable date: {s}")))
}

fn decimal_at(column: &Column, idx: usize, name: &str) -> Result<Decimal, LoaderError> {
    // Whole-number columns (integer strikes, round prices) are inferred as
    // integers by the CSV reader.
    let column = column.cast(&DataType::Float64)?;
    let value = column
        .f64()?
        .get(idx)
        .ok_or_else(|| LoaderError::InvalidData(format!("missing {name} at row {idx}")))?;
    Decimal::from_f64_retain(value)
        .ok_or_else(|| LoaderError::InvalidData(format!("non-finite {name} at row {idx}")))
}

/// Load daily underlying bars, sorted by date.
pub fn load_bars(path: &Path) -> Result<Vec<DailyBar>, LoaderError> {
    let df = read_csv(path)?;

    let date_col = df.column("Date")?.str()?.clone();
    let open_col = df.column("Open")?.clone();
    let high_col = df.column("High")?.clone();
    let low_col = df.column("Low")?.clone();
    let close_col = df.column("Close")?.clone();
    let volume_col = df.column("Volume")?.cast(&DataType::Int64)?;
    let volume_col = volume_col.i64()?;

    let mut bars = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let date_str = date_col
            .get(idx)
            .ok_or_else(|| LoaderError::InvalidData(format!("missing Date at row {idx}")))?;
        bars.push(DailyBar {
            date: parse_date(date_str)?,
            open: decimal_at(&open_col, idx, "Open")?,
            high: decimal_at(&high_col, idx, "High")?,
            low: decimal_at(&low_col, idx, "Low")?,
            close: decimal_at(&close_col, idx, "Close")?,
            volume: volume_col.get(idx).unwrap_or(0),
        });
    }

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);

    if bars.is_empty() {
        return Err(LoaderError::InvalidData(format!(
            "no bars in {}",
            path.display()
        )));
    }

    Ok(bars)
}

/// Load a prefetched premium table written by the `fetch` command
/// (columns `date, strike, kind, premium`).
pub fn load_premium_table(path: &Path) -> Result<PremiumTable, LoaderError> {
    let df = read_csv(path)?;

    let date_col = df.column("date")?.str()?.clone();
    let strike_col = df.column("strike")?.clone();
    let kind_col = df.column("kind")?.str()?.clone();
    let premium_col = df.column("premium")?.clone();

    let mut table = PremiumTable::new();
    for idx in 0..df.height() {
        let date_str = date_col
            .get(idx)
            .ok_or_else(|| LoaderError::InvalidData(format!("missing date at row {idx}")))?;
        let kind_str = kind_col
            .get(idx)
            .ok_or_else(|| LoaderError::InvalidData(format!("missing kind at row {idx}")))?;
        let kind = OptionKind::from_str(kind_str)
            .ok_or_else(|| LoaderError::InvalidData(format!("unknown option kind: {kind_str}")))?;

        table.insert(
            OptionRequest {
                date: parse_date(date_str)?,
                strike: decimal_at(&strike_col, idx, "strike")?,
                kind,
            },
            decimal_at(&premium_col, idx, "premium")?,
        );
    }

    Ok(table)
}
