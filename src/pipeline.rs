// src/pipeline.rs
//! One join run: primary sheet in, enriched rows out.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::config::JoinConfig;
use crate::error::JoinError;
use crate::join::{
    output_header, AbcIndex, ColumnRule, ColumnSpec, FbIndex, LookupIndex, ResolvedColumns,
    RowTransformer, WeekSelector,
};
use crate::sheet::{open_sink, SheetRows};

/// Per-run switches from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Invalidate any already-built reference index before it is used.
    pub force_reload: bool,
    /// Accepted for compatibility; has no effect.
    pub preprocess: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub source: PathBuf,
    pub output: PathBuf,
    pub week: WeekSelector,
    pub rows: u64,
}

/// Owns the two reference indexes for the lifetime of a run.
pub struct Pipeline {
    config: JoinConfig,
    week: WeekSelector,
    fb: FbIndex,
    abc: AbcIndex,
}

impl Pipeline {
    pub fn new(config: JoinConfig) -> Result<Self, JoinError> {
        let week = config.week_selector()?;
        Ok(Self::with_week(config, week))
    }

    pub fn with_week(config: JoinConfig, week: WeekSelector) -> Self {
        let fb = LookupIndex::fb(config.fb_path(), week);
        let abc = LookupIndex::abc(config.abc_path());
        Self {
            config,
            week,
            fb,
            abc,
        }
    }

    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    pub fn week(&self) -> WeekSelector {
        self.week
    }

    pub fn fb_index(&self) -> &FbIndex {
        &self.fb
    }

    pub fn abc_index(&self) -> &AbcIndex {
        &self.abc
    }

    /// Run the join. Fatal problems with the primary sheet abort before any
    /// output is written; both indexes are released on every exit path.
    #[instrument(level = "info", skip(self), fields(week = %self.week))]
    pub fn run(&mut self, options: RunOptions) -> Result<RunSummary, JoinError> {
        let start = Instant::now();
        if options.preprocess {
            info!("preprocess flag acknowledged; no preprocessing is performed");
        }
        if options.force_reload {
            self.fb.invalidate();
            self.abc.invalidate();
        }

        let result = self.stream();
        self.release();

        let summary = result?;
        info!(
            rows = summary.rows,
            output = %summary.output.display(),
            elapsed = ?start.elapsed(),
            "processed data rows"
        );
        Ok(summary)
    }

    fn stream(&self) -> Result<RunSummary, JoinError> {
        let source = self.config.locate_primary()?;
        let mut rows = SheetRows::open(&source).map_err(|err| JoinError::UnreadablePrimary {
            path: source.clone(),
            source: err,
        })?;
        let header = rows
            .next()
            .ok_or_else(|| JoinError::MissingHeader(source.clone()))?;
        debug!(columns = header.len(), "read primary header");

        let specs = self.config.wanted_specs();
        let columns = resolve_columns(&header, &specs, &source);

        let output = self.config.output.clone();
        let mut sink = open_sink(&output)?;
        sink.write_header(&output_header())?;

        let transformer = RowTransformer::new(&columns, &self.fb, &self.abc);
        let mut count: u64 = 0;
        for row in rows {
            let cells = transformer.transform(&row);
            sink.write_row(&cells)?;
            count += 1;
            if count <= 3 {
                debug!(row = count, cells = row.len(), "processed row");
            }
        }
        sink.finish()?;

        Ok(RunSummary {
            source,
            output,
            week: self.week,
            rows: count,
        })
    }

    fn release(&mut self) {
        self.fb.invalidate();
        self.abc.invalidate();
    }
}

/// Resolve wanted columns once per run. Derived columns are not expected in
/// the primary sheet, so only missing copy columns are worth a warning.
fn resolve_columns(header: &[String], specs: &[ColumnSpec], source: &Path) -> ResolvedColumns {
    for (idx, label) in header.iter().enumerate() {
        debug!(column = idx, %label, "primary header");
    }
    let columns = ResolvedColumns::resolve(header, specs);
    for (slot, spec) in specs.iter().enumerate() {
        match (columns.index(slot), ColumnRule::for_slot(slot)) {
            (Some(idx), _) => debug!(column = spec.name(), index = idx, "resolved"),
            (None, ColumnRule::Copy) => warn!(
                column = spec.name(),
                source = %source.display(),
                "column not found; it will be blank"
            ),
            (None, rule) => debug!(column = spec.name(), ?rule, "derived column"),
        }
    }
    columns
}
