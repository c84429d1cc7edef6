use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use super::Stage;

/// Runs an external program and fails unless it exits successfully.
#[derive(Debug, Clone)]
pub struct CommandStage {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandStage {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Build from a program followed by its arguments.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.as_str()).args(args.iter().cloned()))
    }

    pub fn args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl Stage for CommandStage {
    fn name(&self) -> &str {
        &self.program
    }

    fn run(&mut self) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        debug!(program = %self.program, args = ?self.args, "spawning");

        let status = cmd
            .status()
            .with_context(|| format!("failed to start `{}`", self.program))?;
        if !status.success() {
            bail!("`{}` exited with {}", self.program, status);
        }
        info!(program = %self.program, "command finished");
        Ok(())
    }
}
