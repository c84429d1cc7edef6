// src/config.rs
//! Run configuration. Every field defaults to the standard directory layout,
//! so running without a config file reproduces the classic behaviour.

use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::JoinError;
use crate::join::{ColumnSpec, WeekSelector, WANTED_COLUMNS};

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "SHEETMERGE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JoinConfig {
    /// Directory holding the three input sheets.
    pub input_dir: PathBuf,
    /// File stem of the primary sheet.
    pub primary_stem: String,
    /// Extensions tried for the primary sheet, in order.
    pub primary_extensions: Vec<String>,
    /// Week-labelled reference sheet, relative to `input_dir`.
    pub fb_file: String,
    /// Key/value reference sheet, relative to `input_dir`.
    pub abc_file: String,
    /// Output file; `.csv` selects CSV output, anything else xlsx.
    pub output: PathBuf,
    /// Fixed week instead of the current one.
    pub week: Option<u32>,
    /// Extra accepted header spellings per wanted column.
    pub column_aliases: BTreeMap<String, Vec<String>>,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            primary_stem: "PCB".into(),
            primary_extensions: vec!["xlsx".into(), "xls".into()],
            fb_file: "FB.xlsx".into(),
            abc_file: "ABC.xlsx".into(),
            output: PathBuf::from("output.xlsx"),
            week: None,
            column_aliases: BTreeMap::new(),
        }
    }
}

impl JoinConfig {
    pub fn load(path: &Path) -> Result<Self, JoinError> {
        let text = fs::read_to_string(path).map_err(|source| JoinError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: JoinConfig =
            serde_yaml::from_str(&text).map_err(|source| JoinError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Explicit path first, then `SHEETMERGE_CONFIG`, then defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, JoinError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn primary_candidates(&self) -> Vec<PathBuf> {
        self.primary_extensions
            .iter()
            .map(|ext| {
                self.input_dir
                    .join(format!("{}.{}", self.primary_stem, ext))
            })
            .collect()
    }

    /// First primary candidate that exists on disk.
    pub fn locate_primary(&self) -> Result<PathBuf, JoinError> {
        let tried = self.primary_candidates();
        match tried.iter().find(|p| p.is_file()) {
            Some(path) => {
                info!(path = %path.display(), "found primary source");
                Ok(path.clone())
            }
            None => Err(JoinError::MissingPrimarySource { tried }),
        }
    }

    pub fn fb_path(&self) -> PathBuf {
        self.input_dir.join(&self.fb_file)
    }

    pub fn abc_path(&self) -> PathBuf {
        self.input_dir.join(&self.abc_file)
    }

    pub fn week_selector(&self) -> Result<WeekSelector, JoinError> {
        match self.week {
            Some(week) => WeekSelector::new(week),
            None => Ok(WeekSelector::current()),
        }
    }

    /// Wanted columns with any configured aliases attached.
    pub fn wanted_specs(&self) -> Vec<ColumnSpec> {
        WANTED_COLUMNS
            .iter()
            .map(|name| {
                self.column_aliases
                    .get(*name)
                    .into_iter()
                    .flatten()
                    .fold(ColumnSpec::new(*name), |spec, alias| {
                        spec.with_alias(alias.as_str())
                    })
            })
            .collect()
    }
}
