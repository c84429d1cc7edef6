// src/join/lookup.rs
//! Lazily-built key → value indexes over the two reference sheets.

use std::{
    cell::Cell,
    collections::HashMap,
    path::{Path, PathBuf},
};

use once_cell::unsync::OnceCell;
use tracing::{debug, info, warn};

use super::columns::ColumnSpec;
use super::week::WeekSelector;
use crate::sheet::{SheetError, SheetRows};

pub const FB_KEY: &str = "REF";
pub const FB_KEY_FR: &str = "Étiquettes de lignes";
pub const ABC_KEY: &str = "WKIDF";
pub const ABC_VALUE: &str = "WKQCO";
pub const ABC_VALUE_FALLBACK: &str = "WLOM";

/// Header positions of the key and value columns of a reference sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValueColumns {
    pub key: usize,
    pub value: usize,
}

/// How a reference sheet's header is turned into key/value positions.
pub trait ColumnPolicy {
    fn select(&self, header: &[String]) -> Option<KeyValueColumns>;
}

/// Week-labelled sheet: key is the `REF` column (or its French label, else
/// the first column); value is the target week's column (the rightmost one
/// if the label repeats), or the leftmost week column when the target week
/// is not in the sheet.
#[derive(Debug, Clone)]
pub struct WeekColumns {
    key: ColumnSpec,
    week: WeekSelector,
}

impl WeekColumns {
    pub fn new(week: WeekSelector) -> Self {
        Self {
            key: ColumnSpec::new(FB_KEY).with_alias(FB_KEY_FR),
            week,
        }
    }
}

impl ColumnPolicy for WeekColumns {
    fn select(&self, header: &[String]) -> Option<KeyValueColumns> {
        let key = self.key.find(header).unwrap_or(0);

        let mut first_week: Option<(usize, u32)> = None;
        let mut target = None;
        for (idx, label) in header.iter().enumerate() {
            if idx == key || self.key.matches(label) {
                continue;
            }
            let Some(week) = WeekSelector::parse_label(label) else {
                continue;
            };
            first_week.get_or_insert((idx, week));
            if week == self.week.number() {
                target = Some(idx);
            }
        }

        let value = match (target, first_week) {
            (Some(idx), _) => {
                debug!(week = self.week.number(), column = idx, "target week column");
                idx
            }
            (None, Some((idx, week))) => {
                info!(
                    target_week = self.week.number(),
                    using_week = week,
                    column = idx,
                    "target week not in sheet, using first available week"
                );
                idx
            }
            (None, None) => return None,
        };
        Some(KeyValueColumns { key, value })
    }
}

/// Plain key/value sheet with fixed column names. The value column name has
/// fallbacks that are only used when the preferred name is absent.
#[derive(Debug, Clone)]
pub struct NamedColumns {
    key: ColumnSpec,
    value: ColumnSpec,
}

impl NamedColumns {
    pub fn new(key: ColumnSpec, value: ColumnSpec) -> Self {
        Self { key, value }
    }

    pub fn abc() -> Self {
        Self::new(
            ColumnSpec::new(ABC_KEY),
            ColumnSpec::new(ABC_VALUE).with_alias(ABC_VALUE_FALLBACK),
        )
    }
}

impl ColumnPolicy for NamedColumns {
    fn select(&self, header: &[String]) -> Option<KeyValueColumns> {
        let key = self.key.find(header)?;
        let value = self.value.find(header)?;
        Some(KeyValueColumns { key, value })
    }
}

/// Entries of a loaded index. Duplicate keys keep every value; lookups see
/// the one inserted last, i.e. the last row in file order.
#[derive(Debug, Default)]
pub struct IndexEntries {
    map: HashMap<String, Vec<String>>,
    len: usize,
}

impl IndexEntries {
    pub fn insert(&mut self, key: String, value: String) {
        self.map.entry(key).or_default().push(value);
        self.len += 1;
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map
            .get(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Total inserted entries, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug)]
enum IndexState {
    Loaded(IndexEntries),
    /// Source missing/unreadable or no usable columns: every lookup misses.
    Unavailable,
}

/// A reference sheet indexed by key, built on first use.
///
/// A source that cannot be read degrades to an empty index with a single
/// warning instead of failing the run; the failure is not retried until
/// [`LookupIndex::invalidate`] is called.
pub struct LookupIndex<P> {
    label: String,
    path: PathBuf,
    policy: P,
    state: OnceCell<IndexState>,
    warned: Cell<bool>,
}

pub type FbIndex = LookupIndex<WeekColumns>;
pub type AbcIndex = LookupIndex<NamedColumns>;

impl<P: ColumnPolicy> LookupIndex<P> {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>, policy: P) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            policy,
            state: OnceCell::new(),
            warned: Cell::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_built(&self) -> bool {
        self.state.get().is_some()
    }

    /// Built, but with nothing usable behind it.
    pub fn is_degraded(&self) -> bool {
        matches!(self.state.get(), Some(IndexState::Unavailable))
    }

    /// Build if needed; returns the number of entries loaded.
    pub fn build(&self) -> usize {
        match self.state() {
            IndexState::Loaded(entries) => entries.len(),
            IndexState::Unavailable => 0,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match self.state() {
            IndexState::Loaded(entries) => entries.get(key),
            IndexState::Unavailable => None,
        }
    }

    /// Drop every entry; the next `get` or `build` re-reads the source.
    pub fn invalidate(&mut self) {
        if self.state.take().is_some() {
            debug!(index = %self.label, "invalidated");
        }
        self.warned.set(false);
    }

    fn state(&self) -> &IndexState {
        self.state.get_or_init(|| self.load())
    }

    #[tracing::instrument(level = "info", skip(self), fields(index = %self.label, path = %self.path.display()))]
    fn load(&self) -> IndexState {
        match self.read_entries() {
            Ok(Some(entries)) => {
                info!(entries = entries.len(), "loaded reference entries");
                let sample: Vec<&str> = entries.map.keys().take(5).map(String::as_str).collect();
                debug!(?sample, "sample keys");
                IndexState::Loaded(entries)
            }
            Ok(None) => {
                self.warn_once("no usable key/value columns; lookups will be blank");
                IndexState::Unavailable
            }
            Err(err) => {
                self.warn_once(&format!("{err}; lookups will be blank"));
                IndexState::Unavailable
            }
        }
    }

    fn read_entries(&self) -> Result<Option<IndexEntries>, SheetError> {
        let mut rows = SheetRows::open(&self.path)?;
        let Some(header) = rows.next() else {
            return Ok(None);
        };
        for (idx, label) in header.iter().enumerate() {
            debug!(column = idx, %label, "header");
        }
        let Some(columns) = self.policy.select(&header) else {
            return Ok(None);
        };
        debug!(key = columns.key, value = columns.value, "selected columns");

        let mut entries = IndexEntries::default();
        for row in rows {
            let key = row.get(columns.key).filter(|s| !s.is_empty());
            let value = row.get(columns.value).filter(|s| !s.is_empty());
            if let (Some(key), Some(value)) = (key, value) {
                entries.insert(key.clone(), value.clone());
            }
        }
        Ok(Some(entries))
    }

    fn warn_once(&self, message: &str) {
        if !self.warned.replace(true) {
            warn!(index = %self.label, path = %self.path.display(), "{message}");
        }
    }
}

impl LookupIndex<WeekColumns> {
    pub fn fb(path: impl Into<PathBuf>, week: WeekSelector) -> Self {
        LookupIndex::new("FB", path, WeekColumns::new(week))
    }
}

impl LookupIndex<NamedColumns> {
    pub fn abc(path: impl Into<PathBuf>) -> Self {
        LookupIndex::new("ABC", path, NamedColumns::abc())
    }
}
