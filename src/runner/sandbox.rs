use crate::{Error, Result, config::RunnerConfig};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one program run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

/// Isolation boundary for learner programs: source text in, captured
/// output out. Implementations must kill the program once `timeout`
/// elapses and report `Error::ExecutionTimeout`.
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn execute(&self, source: &str, timeout: Duration) -> Result<ProcessOutput>;
}

/// Runs the source through a local interpreter in a child process.
///
/// This is not a security boundary: the child inherits the server's
/// filesystem and network access.
pub struct SubprocessSandbox {
    program: String,
    args: Vec<String>,
}

impl SubprocessSandbox {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.interpreter.clone(), config.interpreter_args.clone())
    }
}

#[async_trait]
impl Sandbox for SubprocessSandbox {
    async fn execute(&self, source: &str, timeout: Duration) -> Result<ProcessOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            Error::execution_failure(format!("Failed to start {}: {}", self.program, e))
        })?;
        debug!(pid = child.id(), program = %self.program, "spawned learner process");

        // Dropping the in-flight wait on timeout drops the child, and
        // kill_on_drop sends SIGKILL.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            }),
            Ok(Err(e)) => Err(Error::execution_failure(format!(
                "Failed to collect process output: {}",
                e
            ))),
            Err(_) => Err(Error::ExecutionTimeout),
        }
    }
}
