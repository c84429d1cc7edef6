use std::path::PathBuf;

use thiserror::Error;

use crate::sheet::SheetError;

/// Conditions that abort a join run before (or while) producing output.
///
/// Everything recoverable (missing reference sheet, unresolved column, missing
/// lookup key, non-numeric text, undefined ratio) never reaches this type: it
/// is absorbed where it happens and shows up as a blank cell.
#[derive(Error, Debug)]
pub enum JoinError {
    #[error("primary source not found (tried {})", display_paths(.tried))]
    MissingPrimarySource { tried: Vec<PathBuf> },

    #[error("could not read primary sheet {}: {source}", .path.display())]
    UnreadablePrimary {
        path: PathBuf,
        #[source]
        source: SheetError,
    },

    #[error("primary sheet {} has no header row", .0.display())]
    MissingHeader(PathBuf),

    #[error("week {0} is outside 1..=52")]
    InvalidWeek(u32),

    #[error("could not read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("writing output failed: {0}")]
    Output(#[from] SheetError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
