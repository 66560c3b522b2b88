use std::collections::HashSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Value – a single cell of the loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the common dataframe dtypes.
/// Frequency counting downstream keys maps on `Value`, so it must be `Eq` + `Hash`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    Missing,
}

// -- Manual Eq/Hash so we can key a HashMap on Value --

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Number(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Number(v) => write!(f, "{}", format_float(*v)),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Missing => Ok(()),
        }
    }
}

/// Spellings read as "no value" in delimited text.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A",
    "#NA", "<NA>", "1.#IND", "1.#QNAN", "-1.#IND", "-1.#QNAN", "#N/A N/A",
];

/// Whether a raw text cell denotes a missing value.
pub fn is_missing_marker(raw: &str) -> bool {
    MISSING_MARKERS.contains(&raw.trim())
}

impl Value {
    /// Classify one raw text cell.
    pub fn parse(raw: &str) -> Value {
        let s = raw.trim();
        if is_missing_marker(s) {
            return Value::Missing;
        }
        if let Ok(v) = s.parse::<f64>() {
            // `NAN`, `+nan` and friends parse as floats but mean "no value".
            return if v.is_nan() { Value::Missing } else { Value::Number(v) };
        }
        match s {
            "True" | "TRUE" | "true" => Value::Bool(true),
            "False" | "FALSE" | "false" => Value::Bool(false),
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Interpret the value as an `f64`, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

/// Render a float the way dataframe writers do: integral values keep a
/// trailing `.0`, everything else uses the shortest round-trip form.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Inferred type of a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Text,
}

impl ColumnKind {
    /// Infer the column type from already-classified cells.
    ///
    /// A column without any present value counts as numeric (an all-NaN column).
    fn infer(cells: &[Value]) -> ColumnKind {
        let mut present = cells.iter().filter(|v| !v.is_missing()).peekable();
        if present.peek().is_none() {
            return ColumnKind::Numeric;
        }
        let present: Vec<&Value> = present.collect();
        if present.iter().all(|v| matches!(v, Value::Number(_))) {
            ColumnKind::Numeric
        } else if present.iter().all(|v| matches!(v, Value::Bool(_))) {
            ColumnKind::Boolean
        } else {
            ColumnKind::Text
        }
    }
}

/// One named column; every cell agrees with `kind` (or is missing).
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    values: Vec<Value>,
}

impl Column {
    /// Build a column from raw text cells (delimited input).
    ///
    /// Text columns keep the verbatim cell text, so `"007"` is not turned into `7`.
    pub fn from_raw(name: impl Into<String>, raw: Vec<String>) -> Self {
        let parsed: Vec<Value> = raw.iter().map(|s| Value::parse(s)).collect();
        let kind = ColumnKind::infer(&parsed);
        let values = match kind {
            ColumnKind::Text => raw
                .into_iter()
                .map(|s| {
                    if is_missing_marker(&s) {
                        Value::Missing
                    } else {
                        Value::Text(s)
                    }
                })
                .collect(),
            _ => parsed,
        };
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Build a column from typed cells (spreadsheet input).
    pub fn from_values(name: impl Into<String>, cells: Vec<Value>) -> Self {
        let kind = ColumnKind::infer(&cells);
        let values = match kind {
            ColumnKind::Text => cells
                .into_iter()
                .map(|v| match v {
                    Value::Missing | Value::Text(_) => v,
                    other => Value::Text(other.to_string()),
                })
                .collect(),
            _ => cells,
        };
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Per-row numbers, `None` where the cell is missing or not numeric.
    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    /// Only the present numbers, in row order.
    pub fn present_numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The parsed dataset: ordered columns of equal length. Read-only once built.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Assemble a table, padding short columns with missing cells.
    pub fn from_columns(mut columns: Vec<Column>) -> Self {
        let n_rows = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        for col in &mut columns {
            col.values.resize(n_rows, Value::Missing);
        }
        Table { columns, n_rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns holding numbers, in table order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Normalise a header row: blank names become `Unnamed: <i>`, repeats get
/// `.1`, `.2`, ... appended.
pub fn normalize_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (i, h) in raw.iter().enumerate() {
        let base = match h.as_ref().trim() {
            "" => format!("Unnamed: {i}"),
            _ => h.as_ref().to_string(),
        };
        let mut name = base.clone();
        let mut k = 1;
        while seen.contains(&name) {
            name = format!("{base}.{k}");
            k += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn raw(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("", Value::Missing)]
    #[case("NA", Value::Missing)]
    #[case(" nan ", Value::Missing)]
    #[case("NAN", Value::Missing)]
    #[case("+nan", Value::Missing)]
    #[case("3", Value::Number(3.0))]
    #[case("-2.5e1", Value::Number(-25.0))]
    #[case("TRUE", Value::Bool(true))]
    #[case("false", Value::Bool(false))]
    #[case("abc", Value::Text("abc".into()))]
    fn parse_classifies_cells(#[case] input: &str, #[case] expected: Value) {
        assert_eq!(Value::parse(input), expected);
    }

    #[test]
    fn numeric_column_with_gaps() {
        let col = Column::from_raw("score", raw(&["1", "", "3.5", "NA"]));
        assert_eq!(col.kind(), ColumnKind::Numeric);
        assert_eq!(col.missing_count(), 2);
        assert_eq!(col.present_numbers(), vec![1.0, 3.5]);
    }

    #[test]
    fn nan_spellings_outside_the_marker_list_count_as_missing() {
        let col = Column::from_raw("x", raw(&["1", "NAN", "3"]));
        assert_eq!(col.kind(), ColumnKind::Numeric);
        assert_eq!(col.missing_count(), 1);
        assert_eq!(col.present_numbers(), vec![1.0, 3.0]);
    }

    #[test]
    fn mixed_column_keeps_verbatim_text() {
        let col = Column::from_raw("code", raw(&["007", "A1", ""]));
        assert_eq!(col.kind(), ColumnKind::Text);
        assert_eq!(col.values()[0], Value::Text("007".into()));
        assert!(col.values()[2].is_missing());
    }

    #[test]
    fn boolean_column() {
        let col = Column::from_raw("flag", raw(&["True", "False", "True"]));
        assert_eq!(col.kind(), ColumnKind::Boolean);
        assert!(!col.is_numeric());
    }

    #[test]
    fn all_missing_column_counts_as_numeric() {
        let col = Column::from_raw("empty", raw(&["", "NaN"]));
        assert_eq!(col.kind(), ColumnKind::Numeric);
        assert!(col.present_numbers().is_empty());
    }

    #[test]
    fn typed_cells_fall_back_to_text() {
        let col = Column::from_values(
            "mixed",
            vec![Value::Number(1.0), Value::Text("x".into()), Value::Bool(true)],
        );
        assert_eq!(col.kind(), ColumnKind::Text);
        assert_eq!(col.values()[0], Value::Text("1.0".into()));
        assert_eq!(col.values()[2], Value::Text("True".into()));
    }

    #[test]
    fn table_pads_short_columns() {
        let table = Table::from_columns(vec![
            Column::from_raw("a", raw(&["1", "2", "3"])),
            Column::from_raw("b", raw(&["x"])),
        ]);
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.column("b").map(Column::missing_count), Some(2));
        assert_eq!(table.numeric_columns().count(), 1);
    }

    #[test]
    fn headers_are_normalized() {
        let names = normalize_headers(&["a", "", "a", "a", "b"]);
        assert_eq!(names, vec!["a", "Unnamed: 1", "a.1", "a.2", "b"]);
    }

    #[rstest]
    #[case(10.0, "10.0")]
    #[case(0.25, "0.25")]
    #[case(f64::NAN, "")]
    #[case(-3.0, "-3.0")]
    fn floats_render_like_dataframe_writers(#[case] v: f64, #[case] expected: &str) {
        assert_eq!(format_float(v), expected);
    }
}
