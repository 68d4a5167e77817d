use super::Question;
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only view over the question bank file.
///
/// The file is re-read on every call, so edits show up without a restart
/// and a file that disappears is reported as `DataUnavailable`.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    path: PathBuf,
}

impl QuestionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn list_all(&self) -> Result<Vec<Question>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::data_unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let questions = parse_questions(&raw).map_err(|e| match e {
            Error::Serialization(e) => {
                Error::data_unavailable(format!("{}: {}", self.path.display(), e))
            }
            other => other,
        })?;

        debug!(
            "Loaded {} questions from {}",
            questions.len(),
            self.path.display()
        );
        Ok(questions)
    }

    /// `Ok(None)` when the id is absent; errors only when the file is unusable.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Question>> {
        Ok(self.list_all().await?.into_iter().find(|q| q.id == id))
    }
}

fn parse_questions(raw: &str) -> Result<Vec<Question>> {
    let questions: Vec<Question> = serde_json::from_str(raw)?;

    let mut seen = HashSet::new();
    for question in &questions {
        if !seen.insert(question.id) {
            return Err(Error::data_unavailable(format!(
                "duplicate question id {}",
                question.id
            )));
        }
    }

    Ok(questions)
}
