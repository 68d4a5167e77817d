//! Forwards learner questions to a chat-completion API under a fixed persona.

mod persona;

pub use persona::Persona;

use crate::{
    Error, Result,
    config::LlmConfig,
    llm::{ChatCompletionRequest, ChatMessage, LlmClient},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Body of `/ask_ai` and `/request_help`. Missing fields default to empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub problem_context: String,
}

/// Exactly one of `response` or `error` is serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AiReply {
    Success { response: String },
    Failure { error: String },
}

impl AiReply {
    pub fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(response) => AiReply::Success { response },
            Err(e) => {
                // Already-labelled upstream errors carry their own prefix.
                let detail = match e {
                    Error::Llm(msg) | Error::Upstream(msg) => msg,
                    other => other.to_string(),
                };
                AiReply::Failure {
                    error: format!("OpenAI API error: {}", detail),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RelaySettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl From<&LlmConfig> for RelaySettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.7,
        }
    }
}

pub struct FeedbackRelay {
    client: Arc<dyn LlmClient>,
    settings: RelaySettings,
}

impl FeedbackRelay {
    pub fn new(client: Arc<dyn LlmClient>, settings: RelaySettings) -> Self {
        Self { client, settings }
    }

    pub fn build_messages(persona: Persona, query: &AiQuery) -> Vec<ChatMessage> {
        let user_turn = format!(
            "### Problem:\n{}\n\n### Candidate's Code:\n{}\n\n### Candidate's Query:\n{}\n",
            query.problem_context, query.code, query.query
        );

        vec![
            ChatMessage::system(persona.system_prompt()),
            ChatMessage::user(user_turn),
        ]
    }

    /// One upstream call; returns the first choice's text, trimmed.
    pub async fn relay(&self, persona: Persona, query: &AiQuery) -> Result<String> {
        let started = Instant::now();
        info!(
            persona = %persona,
            query_len = query.query.len(),
            code_len = query.code.len(),
            "relay started"
        );

        let request = ChatCompletionRequest {
            messages: Self::build_messages(persona, query),
            max_tokens: Some(self.settings.max_tokens),
            temperature: Some(self.settings.temperature),
        };

        let outcome = self
            .client
            .create_chat_completion(request)
            .await
            .and_then(|response| {
                let usage = response.usage;
                response
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| (choice.message.content.trim().to_string(), usage))
                    .ok_or_else(|| Error::upstream("response contained no choices"))
            });

        let duration_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok((text, usage)) => info!(
                persona = %persona,
                response_len = text.len(),
                prompt_tokens = usage.map(|u| u.prompt_tokens),
                completion_tokens = usage.map(|u| u.completion_tokens),
                total_tokens = usage.map(|u| u.total_tokens),
                duration_ms,
                "relay completed"
            ),
            Err(e) => warn!(
                persona = %persona,
                error_kind = e.kind(),
                error = %e,
                duration_ms,
                "relay failed"
            ),
        }

        outcome.map(|(text, _)| text)
    }
}
