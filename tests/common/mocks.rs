use async_trait::async_trait;
use practice_server::{
    Error, Result,
    llm::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, LlmClient},
    runner::{ProcessOutput, Sandbox},
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock LLM client that always answers with the same text.
#[derive(Debug)]
pub struct MockLlmClient {
    pub reply: String,
    pub requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
    pub error: Option<String>,
}

impl MockLlmClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn get_requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.requests.lock().unwrap().push(request);

        if let Some(ref error) = self.error {
            return Err(Error::llm(error.clone()));
        }

        Ok(ChatCompletionResponse {
            choices: vec![Choice {
                message: ChatMessage::assistant(self.reply.clone()),
            }],
            usage: None,
        })
    }
}

/// Canned result for `StubSandbox`.
#[derive(Debug, Clone)]
pub enum StubOutcome {
    Output(ProcessOutput),
    Timeout,
}

/// Sandbox that never runs anything and returns a canned outcome.
pub struct StubSandbox {
    outcome: StubOutcome,
    pub sources: Arc<Mutex<Vec<String>>>,
}

impl StubSandbox {
    pub fn new(outcome: StubOutcome) -> Self {
        Self {
            outcome,
            sources: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn printing(stdout: &str) -> Self {
        Self::new(StubOutcome::Output(ProcessOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        }))
    }

    pub fn timing_out() -> Self {
        Self::new(StubOutcome::Timeout)
    }

    pub fn failing_with_stderr(stderr: &str) -> Self {
        Self::new(StubOutcome::Output(ProcessOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code: Some(1),
        }))
    }

    pub fn get_sources(&self) -> Vec<String> {
        self.sources.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sandbox for StubSandbox {
    async fn execute(&self, source: &str, _timeout: Duration) -> Result<ProcessOutput> {
        self.sources.lock().unwrap().push(source.to_string());
        match &self.outcome {
            StubOutcome::Output(output) => Ok(output.clone()),
            StubOutcome::Timeout => Err(Error::ExecutionTimeout),
        }
    }
}
