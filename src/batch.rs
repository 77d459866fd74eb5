use std::fmt;
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::VerifError;

/// A program invocation with the process state it runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<Utf8PathBuf>,
    pub env_remove: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env_remove: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: &Utf8Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    pub fn env_remove(mut self, name: impl Into<String>) -> Self {
        self.env_remove.push(name.into());
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs a command to completion and reports failure through the error.
pub trait BatchRunner {
    fn run(&self, command: &CommandLine) -> Result<(), VerifError>;
}

/// Spawns the command on the local machine, inheriting stdio, and waits.
#[derive(Debug, Clone, Default)]
pub struct SystemBatchRunner;

impl SystemBatchRunner {
    pub fn new() -> Self {
        Self
    }
}

impl BatchRunner for SystemBatchRunner {
    fn run(&self, command: &CommandLine) -> Result<(), VerifError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir.as_std_path());
        }
        for name in &command.env_remove {
            cmd.env_remove(name);
        }

        tracing::info!(command = %command, cwd = ?command.current_dir, "launching");
        let status = cmd.status().map_err(|err| VerifError::SubprocessFailure {
            command: command.to_string(),
            message: err.to_string(),
        })?;
        if status.success() {
            return Ok(());
        }
        let message = match status.code() {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        };
        Err(VerifError::SubprocessFailure {
            command: command.to_string(),
            message,
        })
    }
}
