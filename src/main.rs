use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sheetmerge::{logging::init_tracing, JoinConfig, Pipeline, RunOptions};
use tracing::info;

/// Merge PCB with the FB and ABC reference sheets into one output table.
#[derive(Parser, Debug)]
#[command(name = "sheetmerge", version)]
struct Cli {
    /// Re-read FB and ABC before use instead of trusting a cached index
    #[arg(long)]
    reload: bool,

    /// Accepted for compatibility; does nothing
    #[arg(long)]
    preprocess: bool,

    /// YAML config file (defaults to $SHEETMERGE_CONFIG, then built-in layout)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use this week's FB column instead of the current week
    #[arg(long, value_name = "WEEK")]
    week: Option<u32>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    init_tracing("info");
    let cli = Cli::parse();
    if cli.reload {
        info!("force reload: FB and ABC will be re-read");
    }

    // ─── 2) configure ────────────────────────────────────────────────
    let mut config = JoinConfig::resolve(cli.config.as_deref())?;
    if let Some(week) = cli.week {
        config.week = Some(week);
    }
    let mut pipeline = Pipeline::new(config)?;
    info!(week = %pipeline.week(), "current week");

    // ─── 3) join ─────────────────────────────────────────────────────
    let summary = pipeline.run(RunOptions {
        force_reload: cli.reload,
        preprocess: cli.preprocess,
    })?;
    info!(
        rows = summary.rows,
        output = %summary.output.display(),
        "extraction complete"
    );
    Ok(())
}
