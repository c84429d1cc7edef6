// src/join/mod.rs
//! The join-and-transform engine: header resolution, reference indexes,
//! per-row rules and the derived columns.

pub mod columns;
pub mod derive;
pub mod lookup;
pub mod transform;
pub mod week;

pub use columns::{ColumnSpec, ResolvedColumns, OUTPUT_WIDTH, TRAILING_COLUMNS, WANTED_COLUMNS};
pub use lookup::{AbcIndex, ColumnPolicy, FbIndex, LookupIndex, NamedColumns, WeekColumns};
pub use transform::{ColumnRule, RowTransformer};
pub use week::WeekSelector;

/// Output header: the wanted columns in order, then the trailing pair.
pub fn output_header() -> Vec<&'static str> {
    WANTED_COLUMNS
        .iter()
        .chain(TRAILING_COLUMNS.iter())
        .copied()
        .collect()
}
