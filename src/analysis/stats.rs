use std::collections::HashMap;

use crate::data::model::{Column, ColumnKind, Table, Value};

use super::report::{ReportTable, ReportValue};

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Arithmetic mean; NaN when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1); NaN with fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile of already-sorted data with linear interpolation between the two
/// nearest ranks (`pos = q * (n - 1)`).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Sort a copy of `values`, NaNs excluded.
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    v.sort_by(f64::total_cmp);
    v
}

/// Pearson correlation over pairs where both sides are present.
///
/// NaN when fewer than two pairs remain or either side has no variance.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

const CATEGORICAL_ROWS: [&str; 3] = ["unique", "top", "freq"];
const NUMERIC_ROWS: [&str; 7] = ["mean", "std", "min", "25%", "50%", "75%", "max"];

/// Describe-style summary: one column per table column, one row per statistic.
///
/// `unique/top/freq` only appear when some column is non-numeric, `mean..max`
/// only when some column is numeric.
pub fn generate_summary(table: &Table) -> ReportTable {
    let names: Vec<String> = table.columns().iter().map(|c| c.name().to_string()).collect();
    let mut report = ReportTable::new(names);

    let has_numeric = table.columns().iter().any(Column::is_numeric);
    let has_categorical = table.columns().iter().any(|c| !c.is_numeric());

    let per_column: Vec<ColumnSummary> = table.columns().iter().map(ColumnSummary::of).collect();

    // Numeric columns describe as floats, so their count prints as `9.0`.
    report.push_row(
        "count",
        per_column
            .iter()
            .map(|s| match s.detail {
                SummaryDetail::Numeric(_) => ReportValue::Float(s.count as f64),
                SummaryDetail::Categorical { .. } => ReportValue::Count(s.count),
            })
            .collect(),
    );

    if has_categorical {
        for (i, label) in CATEGORICAL_ROWS.iter().enumerate() {
            let row = per_column
                .iter()
                .map(|s| match &s.detail {
                    SummaryDetail::Categorical { unique, top, freq } => match (i, top) {
                        (0, _) => ReportValue::Count(*unique),
                        (1, Some(top)) => ReportValue::Text(top.to_string()),
                        (2, Some(_)) => ReportValue::Count(*freq),
                        _ => ReportValue::Empty,
                    },
                    SummaryDetail::Numeric(_) => ReportValue::Empty,
                })
                .collect();
            report.push_row(*label, row);
        }
    }

    if has_numeric {
        for (i, label) in NUMERIC_ROWS.iter().enumerate() {
            let row = per_column
                .iter()
                .map(|s| match &s.detail {
                    SummaryDetail::Numeric(stats) => ReportValue::Float(stats[i]),
                    SummaryDetail::Categorical { .. } => ReportValue::Empty,
                })
                .collect();
            report.push_row(*label, row);
        }
    }

    report
}

struct ColumnSummary {
    count: usize,
    detail: SummaryDetail,
}

enum SummaryDetail {
    /// mean, std, min, 25%, 50%, 75%, max
    Numeric([f64; 7]),
    Categorical {
        unique: usize,
        top: Option<Value>,
        freq: usize,
    },
}

impl ColumnSummary {
    fn of(column: &Column) -> Self {
        let count = column.values().len() - column.missing_count();
        let detail = match column.kind() {
            ColumnKind::Numeric => {
                let values = column.present_numbers();
                let sorted = sorted_finite(&values);
                SummaryDetail::Numeric([
                    mean(&values),
                    sample_std(&values),
                    sorted.first().copied().unwrap_or(f64::NAN),
                    quantile_sorted(&sorted, 0.25),
                    quantile_sorted(&sorted, 0.50),
                    quantile_sorted(&sorted, 0.75),
                    sorted.last().copied().unwrap_or(f64::NAN),
                ])
            }
            ColumnKind::Boolean | ColumnKind::Text => {
                let (unique, top, freq) = most_frequent(column.values());
                SummaryDetail::Categorical { unique, top, freq }
            }
        };
        ColumnSummary { count, detail }
    }
}

/// Distinct present values, the most frequent one (ties go to the first seen)
/// and its frequency.
fn most_frequent(values: &[Value]) -> (usize, Option<Value>, usize) {
    // value → (count, first row)
    let mut counts: HashMap<&Value, (usize, usize)> = HashMap::new();
    for (row, v) in values.iter().enumerate().filter(|(_, v)| !v.is_missing()) {
        counts.entry(v).or_insert((0, row)).0 += 1;
    }
    let top = counts
        .iter()
        .max_by(|(_, (ca, ra)), (_, (cb, rb))| ca.cmp(cb).then(rb.cmp(ra)))
        .map(|(v, (c, _))| ((*v).clone(), *c));
    match top {
        Some((v, freq)) => (counts.len(), Some(v), freq),
        None => (0, None, 0),
    }
}

// ---------------------------------------------------------------------------
// Missing values
// ---------------------------------------------------------------------------

/// One row per column with its missing-cell count, under an unnamed value
/// column (`0`).
pub fn generate_missing_data_report(table: &Table) -> ReportTable {
    let mut report = ReportTable::new(vec!["0".to_string()]);
    for col in table.columns() {
        report.push_row(col.name(), vec![ReportValue::Count(col.missing_count())]);
    }
    report
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlations between the numeric columns.
///
/// Boolean columns without missing cells take part as 0/1; a boolean column
/// with gaps is object-like and left out.
#[derive(Debug, Clone, Default)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Row-major, `names.len()²` entries; NaN where undefined.
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn compute(table: &Table) -> Self {
        let numeric: Vec<(&str, Vec<Option<f64>>)> = table
            .columns()
            .iter()
            .filter_map(|c| correlation_input(c).map(|values| (c.name(), values)))
            .collect();
        let n = numeric.len();
        let mut values = vec![f64::NAN; n * n];
        for i in 0..n {
            for j in i..n {
                let r = pearson(&numeric[i].1, &numeric[j].1);
                values[i * n + j] = r;
                values[j * n + i] = r;
            }
        }
        CorrelationMatrix {
            names: numeric.iter().map(|(name, _)| name.to_string()).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.len() + col]
    }

    pub fn to_report(&self) -> ReportTable {
        let mut report = ReportTable::new(self.names.clone());
        for (i, name) in self.names.iter().enumerate() {
            let row = (0..self.len())
                .map(|j| ReportValue::Float(self.get(i, j)))
                .collect();
            report.push_row(name.clone(), row);
        }
        report
    }
}

/// Per-row numbers a column contributes to the correlation matrix, if any.
fn correlation_input(column: &Column) -> Option<Vec<Option<f64>>> {
    match column.kind() {
        ColumnKind::Numeric => Some(column.numbers()),
        ColumnKind::Boolean if column.missing_count() == 0 => Some(
            column
                .values()
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                    _ => None,
                })
                .collect(),
        ),
        ColumnKind::Boolean | ColumnKind::Text => None,
    }
}

/// Correlation table over the numeric (and complete boolean) columns. Empty
/// with none of them, a single cell with one.
pub fn generate_correlation_matrix(table: &Table) -> ReportTable {
    CorrelationMatrix::compute(table).to_report()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn raw(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn table(cols: &[(&str, &[&str])]) -> Table {
        Table::from_columns(
            cols.iter()
                .map(|(name, cells)| Column::from_raw(*name, raw(cells)))
                .collect(),
        )
    }

    fn float(report: &ReportTable, row: &str, col: &str) -> f64 {
        report.get(row, col).and_then(ReportValue::as_f64).unwrap()
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile_sorted(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.75) - 3.25).abs() < 1e-12);
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn std_uses_sample_denominator() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((sample_std(&v) - 2.138089935299395).abs() < 1e-12);
        assert!(sample_std(&[1.0]).is_nan());
    }

    #[test]
    fn summary_of_mixed_table() {
        let t = table(&[
            ("name", &["a", "b", "a", ""]),
            ("x", &["1", "2", "3", "4"]),
        ]);
        let s = generate_summary(&t);

        assert_eq!(
            s.row_labels(),
            vec!["count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
        assert_eq!(s.get("count", "name"), Some(&ReportValue::Count(3)));
        assert_eq!(s.get("count", "x"), Some(&ReportValue::Float(4.0)));
        assert_eq!(s.get("unique", "name"), Some(&ReportValue::Count(2)));
        assert_eq!(s.get("top", "name"), Some(&ReportValue::Text("a".into())));
        assert_eq!(s.get("freq", "name"), Some(&ReportValue::Count(2)));
        assert_eq!(s.get("mean", "name"), Some(&ReportValue::Empty));
        assert_eq!(s.get("top", "x"), Some(&ReportValue::Empty));
        assert!((float(&s, "mean", "x") - 2.5).abs() < 1e-12);
        assert!((float(&s, "min", "x") - 1.0).abs() < 1e-12);
        assert!((float(&s, "max", "x") - 4.0).abs() < 1e-12);
    }

    #[test]
    fn summary_of_numeric_only_table_skips_categorical_rows() {
        let t = table(&[("x", &["1", "2"]), ("y", &["3", ""])]);
        let s = generate_summary(&t);
        assert_eq!(
            s.row_labels(),
            vec!["count", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
        assert_eq!(s.get("count", "y"), Some(&ReportValue::Float(1.0)));
        assert!(float(&s, "std", "y").is_nan());
    }

    #[test]
    fn summary_of_text_only_table_skips_numeric_rows() {
        let t = table(&[("c", &["u", "v", "v"])]);
        let s = generate_summary(&t);
        assert_eq!(s.row_labels(), vec!["count", "unique", "top", "freq"]);
        assert_eq!(s.get("top", "c"), Some(&ReportValue::Text("v".into())));
    }

    #[test]
    fn top_ties_go_to_first_seen() {
        let t = table(&[("c", &["b", "a", "a", "b"])]);
        let s = generate_summary(&t);
        assert_eq!(s.get("top", "c"), Some(&ReportValue::Text("b".into())));
    }

    #[test]
    fn missing_report_counts_each_column() {
        let t = table(&[
            ("id", &["a", "b", "c", "d", "e"]),
            ("score", &["1", "", "3", "NA", "5"]),
        ]);
        let r = generate_missing_data_report(&t);
        assert_eq!(r.get("id", "0"), Some(&ReportValue::Count(0)));
        assert_eq!(r.get("score", "0"), Some(&ReportValue::Count(2)));
    }

    #[test]
    fn doubled_column_correlates_perfectly() {
        let t = table(&[
            ("a", &["1", "2", "3", "4", "5"]),
            ("b", &["2", "4", "6", "8", "10"]),
            ("c", &["5", "4", "3", "2", "1"]),
        ]);
        let r = generate_correlation_matrix(&t);
        assert!((float(&r, "a", "b") - 1.0).abs() < 1e-10);
        assert!((float(&r, "b", "a") - 1.0).abs() < 1e-10);
        assert!((float(&r, "a", "c") + 1.0).abs() < 1e-10);
        assert!((float(&r, "a", "a") - 1.0).abs() < 1e-10);
    }

    #[test]
    fn correlation_ignores_text_and_uses_pairwise_rows() {
        let t = table(&[
            ("label", &["p", "q", "r", "s"]),
            ("a", &["1", "2", "", "4"]),
            ("b", &["2", "4", "100", "8"]),
        ]);
        let m = CorrelationMatrix::compute(&t);
        assert_eq!(m.names, vec!["a", "b"]);
        assert!((m.get(0, 1) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn complete_boolean_columns_correlate_as_zero_one() {
        let t = table(&[
            ("a", &["1", "2", "3"]),
            ("f", &["True", "False", "True"]),
            ("g", &["True", "", "False"]),
            ("label", &["p", "q", "r"]),
        ]);
        let m = CorrelationMatrix::compute(&t);
        assert_eq!(m.names, vec!["a", "f"]);
        assert!(m.get(0, 1).abs() < 1e-12);
        assert!((m.get(1, 1) - 1.0).abs() < 1e-12);
        // Booleans still stay out of the per-column plots.
        assert_eq!(t.numeric_columns().count(), 1);
    }

    #[test]
    fn degenerate_correlation_tables() {
        let none = CorrelationMatrix::compute(&table(&[("t", &["x", "y"])]));
        assert_eq!(none.len(), 0);
        assert!(none.to_report().rows.is_empty());

        let single = generate_correlation_matrix(&table(&[("t", &["x", "y"]), ("v", &["1", "2"])]));
        assert_eq!(single.columns, vec!["v"]);
        assert_eq!(single.rows.len(), 1);

        let constant = CorrelationMatrix::compute(&table(&[("k", &["3", "3", "3"])]));
        assert!(constant.get(0, 0).is_nan());
    }
}
