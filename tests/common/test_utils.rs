use super::mocks::{MockLlmClient, StubSandbox};
use axum::Router;
use practice_server::{
    llm::LlmClient,
    questions::QuestionStore,
    relay::{FeedbackRelay, RelaySettings},
    runner::{CodeRunner, Sandbox},
    server::{self, AppState},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const SAMPLE_QUESTIONS_JSON: &str = r#"[
  {
    "id": 1,
    "title": "Two Sum",
    "prompt": "Return indices of the two numbers that add up to target.",
    "starter_code": "def two_sum(nums, target):\n    pass\n",
    "test_cases": [{ "input": "result = two_sum([2, 7, 11, 15], 9)", "expected_output": "[0, 1]" }]
  },
  {
    "id": 2,
    "title": "Valid Parentheses",
    "prompt": "Decide whether the brackets are balanced.",
    "starter_code": "def is_valid(s):\n    pass\n",
    "difficulty": "Easy"
  },
  {
    "id": 7,
    "title": "Merge Intervals",
    "prompt": "Merge all overlapping intervals.",
    "starter_code": "def merge(intervals):\n    pass\n"
  }
]"#;

pub const SAMPLE_TITLES: [&str; 3] = ["Two Sum", "Valid Parentheses", "Merge Intervals"];

/// Create a temporary directory holding a questions file
pub fn create_questions_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("questions.json");
    std::fs::write(&path, contents).expect("Failed to write questions file");
    (temp_dir, path)
}

pub fn build_state(
    questions_path: &Path,
    sandbox: Arc<dyn Sandbox>,
    llm_client: Arc<dyn LlmClient>,
) -> AppState {
    AppState {
        questions: Arc::new(QuestionStore::new(questions_path)),
        runner: Arc::new(CodeRunner::new(sandbox)),
        relay: Arc::new(FeedbackRelay::new(llm_client, RelaySettings::default())),
    }
}

/// Full router over the sample questions with stubbed execution and LLM.
pub fn create_test_app() -> (Router, TempDir) {
    let (temp_dir, path) = create_questions_file(SAMPLE_QUESTIONS_JSON);
    let state = build_state(
        &path,
        Arc::new(StubSandbox::printing("[0, 1]\n")),
        Arc::new(MockLlmClient::new("Looks good to me.")),
    );
    (server::router(state), temp_dir)
}

pub fn create_app_with(
    sandbox: Arc<dyn Sandbox>,
    llm_client: Arc<dyn LlmClient>,
) -> (Router, TempDir) {
    let (temp_dir, path) = create_questions_file(SAMPLE_QUESTIONS_JSON);
    let state = build_state(&path, sandbox, llm_client);
    (server::router(state), temp_dir)
}

/// Whether a usable `python3` exists on this machine.
pub fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
