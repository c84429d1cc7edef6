//! Mapping wanted column names onto positions in a sheet's header.

use std::iter;

/// Wanted output columns, in output order.
pub const WANTED_COLUMNS: [&str; 12] = [
    "WSTB", "WIDF", "WFOR", "WGES", "WPIV", "WDES", "WCOF", "WLOM", "WCMJ", "WSTKG", "FB", "MAX",
];

/// Labels of the two columns appended after the wanted ones.
pub const TRAILING_COLUMNS: [&str; 2] = ["Inventaire", "couv"];

/// Output width: wanted columns plus the trailing pair.
pub const OUTPUT_WIDTH: usize = WANTED_COLUMNS.len() + TRAILING_COLUMNS.len();

// Slots (positions in WANTED_COLUMNS) with a fixed meaning.
pub const RECORD_ID: usize = 1;
pub const ABC_VALUE: usize = 7;
pub const COMPARISON: usize = 8;
pub const QUANTITY: usize = 9;
pub const FB_VALUE: usize = 10;
pub const MAX_VALUE: usize = 11;

/// A column name plus alternate spellings, in order of preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    name: String,
    aliases: Vec<String>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical name first, then aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn matches(&self, label: &str) -> bool {
        self.names().any(|n| n == label)
    }

    /// Position of the most preferred name present in `header`; for that name,
    /// its first occurrence. A less preferred name never wins over a more
    /// preferred one, wherever they sit in the header. Exact, case-sensitive.
    pub fn find(&self, header: &[String]) -> Option<usize> {
        self.names()
            .find_map(|candidate| header.iter().position(|label| label == candidate))
    }
}

/// Header positions for a list of wanted columns, computed once per sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    indices: Vec<Option<usize>>,
}

impl ResolvedColumns {
    pub fn resolve(header: &[String], wanted: &[ColumnSpec]) -> Self {
        Self {
            indices: wanted.iter().map(|spec| spec.find(header)).collect(),
        }
    }

    pub fn index(&self, slot: usize) -> Option<usize> {
        self.indices.get(slot).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Non-empty cell of `row` for `slot`, if the column resolved and the row
    /// is long enough to hold it.
    pub fn cell<'r>(&self, slot: usize, row: &'r [String]) -> Option<&'r str> {
        let idx = self.index(slot)?;
        row.get(idx).map(String::as_str).filter(|c| !c.is_empty())
    }
}
