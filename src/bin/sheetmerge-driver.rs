//! sheetmerge-driver: regenerate the input sheets, then run the join.
//!
//! - By default the inputs are exported from the SQLite database (`--db`).
//! - `--regenerate-with <CMD>...` runs an external command instead.
//! - Either stage failing stops the run with exit code 1; nothing is retried.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sheetmerge::{
    logging::init_tracing,
    stage::{run_stages, CommandStage, JoinStage, SqliteExportStage, Stage},
    JoinConfig, Pipeline, RunOptions,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sheetmerge-driver", version)]
struct Cli {
    /// SQLite database the input sheets are exported from
    #[arg(long, value_name = "PATH", default_value = "data.db")]
    db: PathBuf,

    /// External command (and arguments) that regenerates the inputs instead
    #[arg(long, value_name = "CMD", num_args = 1.., allow_hyphen_values = true)]
    regenerate_with: Vec<String>,

    /// YAML config file for the join
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Re-read reference sheets before use
    #[arg(long)]
    reload: bool,
}

fn main() -> Result<()> {
    init_tracing("info");
    let cli = Cli::parse();

    let config = JoinConfig::resolve(cli.config.as_deref())?;
    let regenerate: Box<dyn Stage> = match CommandStage::from_argv(&cli.regenerate_with) {
        Some(command) => Box::new(command),
        None => Box::new(SqliteExportStage::new(&cli.db, &config.input_dir)),
    };
    let join = JoinStage::new(
        Pipeline::new(config)?,
        RunOptions {
            force_reload: cli.reload,
            preprocess: false,
        },
    );

    let mut stages: Vec<Box<dyn Stage>> = vec![regenerate, Box::new(join)];
    run_stages(&mut stages)?;
    info!("done");
    Ok(())
}
