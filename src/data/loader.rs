use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use thiserror::Error;

use super::model::{normalize_headers, Column, Table, Value};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a table could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("cannot read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("workbook {0} has no sheets")]
    NoSheets(String),
    #[error("no columns to parse from {0}")]
    NoColumns(String),
    #[error("line {line}: expected {expected} fields, saw {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// * `.xlsx` / `.xlsm` / `.xls` – first sheet, first row is the header
/// * anything else – comma-separated text, first row is the header
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    if is_spreadsheet(path) {
        load_spreadsheet(path)
    } else {
        load_csv(path)
    }
}

/// Whether `path` is read with spreadsheet semantics.
pub fn is_spreadsheet(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    matches!(ext.as_str(), "xlsx" | "xlsm" | "xls")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Rows shorter than the header are padded with missing cells; longer rows
/// are rejected.
fn load_csv(path: &Path) -> Result<Table, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let raw_headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    if raw_headers.is_empty() || (raw_headers.len() == 1 && raw_headers[0].is_empty()) {
        return Err(LoadError::NoColumns(path.display().to_string()));
    }
    let headers = normalize_headers(&raw_headers);

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        if record.len() > headers.len() {
            return Err(LoadError::RaggedRow {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: headers.len(),
                found: record.len(),
            });
        }
        for (col_idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(col_idx).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column::from_raw(name, raw))
        .collect();
    let table = Table::from_columns(columns);
    log::debug!(
        "Parsed CSV {} ({} rows × {} columns)",
        path.display(),
        table.n_rows(),
        table.n_columns()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first sheet of a workbook.  The first non-empty row is the
/// header; leading blank rows are skipped, leading blank columns are kept.
fn load_spreadsheet(path: &Path) -> Result<Table, LoadError> {
    if !path.exists() {
        return Err(LoadError::Io {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    }
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::NoSheets(path.display().to_string()))??;

    // The used range starts at the first non-empty cell. Blank columns to its
    // left still exist in the sheet and load as unnamed, empty columns.
    let leading = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| LoadError::NoColumns(path.display().to_string()))?;
    let raw_headers: Vec<String> = std::iter::repeat(String::new())
        .take(leading)
        .chain(header_row.iter().map(header_text))
        .collect();
    let headers = normalize_headers(&raw_headers);

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col_idx, column) in cells.iter_mut().enumerate() {
            let cell = col_idx.checked_sub(leading).and_then(|i| row.get(i));
            column.push(cell.map(cell_value).unwrap_or(Value::Missing));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::from_values(name, values))
        .collect();
    let table = Table::from_columns(columns);
    log::debug!(
        "Parsed workbook {} ({} rows × {} columns)",
        path.display(),
        table.n_rows(),
        table.n_columns()
    );
    Ok(table)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::Float(f) => crate::data::model::format_float(*f),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) if f.is_nan() => Value::Missing,
        Data::Float(f) => Value::Number(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) if s.trim().is_empty() => Value::Missing,
        Data::String(s) => Value::Text(s.clone()),
        Data::Empty | Data::Error(_) => Value::Missing,
        other => Value::Text(other.to_string()),
    }
}
