//! Executes learner code against one test case and grades the output.

mod sandbox;

pub use sandbox::{ProcessOutput, Sandbox, SubprocessSandbox};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const EXECUTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Variable the learner code and test snippet are expected to populate.
pub const RESULT_VARIABLE: &str = "result";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub test_input: String,
    #[serde(default)]
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub actual_output: String,
    pub expected_output: String,
    pub correct: bool,
}

/// Exactly one of a verdict or `{ "error": ... }` is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunCodeReply {
    Verdict(ExecutionResult),
    Failure { error: String },
}

impl From<Result<ExecutionResult>> for RunCodeReply {
    fn from(result: Result<ExecutionResult>) -> Self {
        match result {
            Ok(verdict) => RunCodeReply::Verdict(verdict),
            Err(e) => RunCodeReply::Failure {
                error: e.to_string(),
            },
        }
    }
}

pub struct CodeRunner {
    sandbox: Arc<dyn Sandbox>,
    timeout: Duration,
}

impl CodeRunner {
    pub fn new(sandbox: Arc<dyn Sandbox>) -> Self {
        Self {
            sandbox,
            timeout: EXECUTION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn assemble(request: &ExecutionRequest) -> String {
        format!(
            "{}\n{}\nprint({})\n",
            request.code, request.test_input, RESULT_VARIABLE
        )
    }

    /// Grades trimmed stdout against `expected` by exact string equality.
    pub fn grade(stdout: &str, expected: &str) -> ExecutionResult {
        let actual_output = stdout.trim().to_string();
        ExecutionResult {
            correct: actual_output == expected,
            actual_output,
            expected_output: expected.to_string(),
        }
    }

    pub async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionResult> {
        let started = Instant::now();
        info!(
            code_len = request.code.len(),
            test_input_len = request.test_input.len(),
            "execution started"
        );

        let outcome = self.execute(request).await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(verdict) => info!(correct = verdict.correct, duration_ms, "execution completed"),
            Err(e) => warn!(error_kind = e.kind(), duration_ms, "execution failed"),
        }

        outcome
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult> {
        let source = Self::assemble(request);
        let output = self.sandbox.execute(&source, self.timeout).await?;

        if !output.stderr.is_empty() {
            return Err(Error::ExecutionFailure(output.stderr));
        }

        match output.exit_code {
            Some(0) => Ok(Self::grade(&output.stdout, &request.expected_output)),
            Some(code) => Err(Error::execution_failure(format!(
                "Process exited with status {}",
                code
            ))),
            None => Err(Error::execution_failure("Process terminated by signal")),
        }
    }
}
