//! Merges a primary record sheet with two reference sheets into one output
//! table: columns are picked by header name, enriched by key lookups, and
//! extended with a max and a coverage ratio.

pub mod config;
pub mod error;
pub mod join;
pub mod logging;
pub mod pipeline;
pub mod sheet;
pub mod stage;

#[cfg(test)]
mod test_support;

pub use config::JoinConfig;
pub use error::JoinError;
pub use pipeline::{Pipeline, RunOptions, RunSummary};
