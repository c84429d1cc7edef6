// src/stage/mod.rs
//! Sequencing of the regenerate-inputs step and the join as explicit stages.

pub mod command;
pub mod export;

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::pipeline::{Pipeline, RunOptions};

pub use command::CommandStage;
pub use export::SqliteExportStage;

/// One step of a batch: succeeds or fails, nothing in between.
pub trait Stage {
    fn name(&self) -> &str;
    fn run(&mut self) -> Result<()>;
}

/// Run stages in order, stopping at the first failure. No retries.
pub fn run_stages(stages: &mut [Box<dyn Stage>]) -> Result<()> {
    for stage in stages.iter_mut() {
        let name = stage.name().to_string();
        let start = Instant::now();
        info!(stage = %name, "starting");
        if let Err(err) = stage.run() {
            error!(stage = %name, "failed: {err:#}");
            return Err(err).with_context(|| format!("stage `{name}` failed"));
        }
        info!(stage = %name, elapsed = ?start.elapsed(), "done");
    }
    Ok(())
}

/// The join itself, as a stage.
pub struct JoinStage {
    pipeline: Pipeline,
    options: RunOptions,
}

impl JoinStage {
    pub fn new(pipeline: Pipeline, options: RunOptions) -> Self {
        Self { pipeline, options }
    }
}

impl Stage for JoinStage {
    fn name(&self) -> &str {
        "join"
    }

    fn run(&mut self) -> Result<()> {
        let summary = self.pipeline.run(self.options)?;
        info!(
            rows = summary.rows,
            source = %summary.source.display(),
            output = %summary.output.display(),
            "join complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::{cell::RefCell, rc::Rc};

    struct Recorder {
        name: &'static str,
        fail: bool,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Stage for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn run(&mut self) -> Result<()> {
            self.log.borrow_mut().push(self.name);
            if self.fail {
                bail!("{} broke", self.name);
            }
            Ok(())
        }
    }

    fn recorder(name: &'static str, fail: bool, log: &Rc<RefCell<Vec<&'static str>>>) -> Box<dyn Stage> {
        Box::new(Recorder {
            name,
            fail,
            log: Rc::clone(log),
        })
    }

    #[test]
    fn runs_all_stages_in_order() -> Result<()> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut stages = vec![recorder("export", false, &log), recorder("join", false, &log)];
        run_stages(&mut stages)?;
        assert_eq!(*log.borrow(), vec!["export", "join"]);
        Ok(())
    }

    #[test]
    fn stops_at_first_failure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut stages = vec![recorder("export", true, &log), recorder("join", false, &log)];
        let err = run_stages(&mut stages).unwrap_err();
        assert_eq!(*log.borrow(), vec!["export"]);
        assert_eq!(err.to_string(), "stage `export` failed");
        assert!(format!("{err:#}").contains("export broke"));
    }
}
