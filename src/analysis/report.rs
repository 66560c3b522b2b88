use std::path::Path;

use anyhow::{Context, Result};

use crate::data::model::format_float;

// ---------------------------------------------------------------------------
// ReportTable – a derived table persisted as CSV
// ---------------------------------------------------------------------------

/// A single cell of a derived report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    Float(f64),
    Count(usize),
    Text(String),
    Empty,
}

impl ReportValue {
    fn render(&self) -> String {
        match self {
            ReportValue::Float(v) => format_float(*v),
            ReportValue::Count(n) => n.to_string(),
            ReportValue::Text(s) => s.clone(),
            ReportValue::Empty => String::new(),
        }
    }
}

/// Labelled rows under a header: the first CSV column holds the row labels
/// and has an empty header cell.
#[derive(Debug, Clone, Default)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<(String, Vec<ReportValue>)>,
}

impl ReportTable {
    pub fn new(columns: Vec<String>) -> Self {
        ReportTable {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, label: impl Into<String>, values: Vec<ReportValue>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.rows.push((label.into(), values));
    }

    /// Write the table as CSV, replacing any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;

        let header = std::iter::once(String::new()).chain(self.columns.iter().cloned());
        writer
            .write_record(header)
            .with_context(|| format!("writing header of {}", path.display()))?;

        for (label, values) in &self.rows {
            let record = std::iter::once(label.clone()).chain(values.iter().map(ReportValue::render));
            writer
                .write_record(record)
                .with_context(|| format!("writing row '{label}' of {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("flushing {}", path.display()))?;
        Ok(())
    }
}

// -- Lookups used by the statistics tests --

#[cfg(test)]
impl ReportValue {
    /// The numeric content, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReportValue::Float(v) => Some(*v),
            ReportValue::Count(n) => Some(*n as f64),
            _ => None,
        }
    }
}

#[cfg(test)]
impl ReportTable {
    /// Look up a cell by row label and column name.
    pub fn get(&self, row: &str, column: &str) -> Option<&ReportValue> {
        let col_idx = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|(label, _)| label == row)
            .and_then(|(_, values)| values.get(col_idx))
    }

    pub fn row_labels(&self) -> Vec<&str> {
        self.rows.iter().map(|(label, _)| label.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_layout_matches_dataframe_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let mut table = ReportTable::new(vec!["a".into(), "b".into()]);
        table.push_row("count", vec![ReportValue::Float(3.0), ReportValue::Count(2)]);
        table.push_row("top", vec![ReportValue::Empty, ReportValue::Text("x, y".into())]);
        table.push_row("std", vec![ReportValue::Float(f64::NAN), ReportValue::Float(0.5)]);
        table.write_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, ",a,b\ncount,3.0,2\ntop,,\"x, y\"\nstd,,0.5\n");
    }

    #[test]
    fn empty_table_writes_a_single_blank_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        ReportTable::default().write_csv(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "\"\"\n");
    }

    #[test]
    fn lookup_by_label_and_column() {
        let mut table = ReportTable::new(vec!["0".into()]);
        table.push_row("score", vec![ReportValue::Count(1)]);
        assert_eq!(table.get("score", "0"), Some(&ReportValue::Count(1)));
        assert_eq!(table.get("other", "0"), None);
    }
}
