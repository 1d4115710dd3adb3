//! Parsing dataset files into [`Table`]s. Persistence lives in the store.

use std::collections::HashSet;

use thiserror::Error;

use super::category::extension;
use super::npy::{self, NpyError};
use crate::storage::models::{Table, Value};

#[derive(Debug, Error)]
pub enum TabularError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("NPY error: {0}")]
    Npy(#[from] NpyError),
    #[error("file has no header row")]
    MissingHeader,
    #[error("unsupported dataset format '{0}'")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Npy,
}

impl DatasetFormat {
    pub fn from_filename(filename: &str) -> Result<Self, TabularError> {
        match extension(filename).as_deref() {
            Some("csv") => Ok(DatasetFormat::Csv),
            Some("npy") => Ok(DatasetFormat::Npy),
            other => Err(TabularError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

pub fn parse_table(format: DatasetFormat, bytes: &[u8]) -> Result<Table, TabularError> {
    match format {
        DatasetFormat::Csv => parse_csv(bytes),
        DatasetFormat::Npy => Ok(npy::decode(bytes)?.into_table()?),
    }
}

/// Header row names the columns; each column gets the narrowest of
/// INTEGER, REAL, or TEXT that fits all of its non-empty cells.
pub fn parse_csv(bytes: &[u8]) -> Result<Table, TabularError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(TabularError::MissingHeader);
    }
    let columns = unique_columns(headers.iter());
    let width = columns.len();

    let mut raw: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut cells: Vec<String> = record.iter().take(width).map(|s| s.to_string()).collect();
        cells.resize(width, String::new());
        raw.push(cells);
    }

    let kinds: Vec<CellKind> = (0..width)
        .map(|i| infer_kind(raw.iter().map(|row| row[i].as_str())))
        .collect();

    let rows = raw
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| kind.convert(cell))
                .collect()
        })
        .collect();

    Ok(Table { columns, rows })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CellKind {
    Integer,
    Real,
    Text,
}

impl CellKind {
    fn convert(&self, cell: String) -> Value {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match self {
            CellKind::Integer => trimmed.parse().map(Value::Integer).unwrap_or(Value::Null),
            CellKind::Real => match trimmed.parse::<f64>() {
                Ok(f) if f.is_nan() => Value::Null,
                Ok(f) => Value::Real(f),
                Err(_) => Value::Null,
            },
            CellKind::Text => Value::Text(cell),
        }
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> CellKind {
    let mut kind = CellKind::Integer;
    for cell in cells.map(str::trim).filter(|c| !c.is_empty()) {
        if kind == CellKind::Integer && cell.parse::<i64>().is_ok() {
            continue;
        }
        if cell.parse::<f64>().is_ok() {
            kind = CellKind::Real;
            continue;
        }
        return CellKind::Text;
    }
    kind
}

/// Blank headers become `column_{i}`; repeats (case-insensitive, as SQLite
/// compares column names) get a `_{n}` suffix.
pub(crate) fn unique_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .enumerate()
        .map(|(i, header)| {
            let base = match header.trim() {
                "" => format!("column_{i}"),
                h => h.to_string(),
            };
            let mut candidate = base.clone();
            let mut n = 1;
            while !seen.insert(candidate.to_lowercase()) {
                candidate = format!("{base}_{n}");
                n += 1;
            }
            candidate
        })
        .collect()
}
