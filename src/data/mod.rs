/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (header row, inferred column kinds)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Column>, read-only for the rest of the run
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
