use super::telemetry::CorrelationId;
use crate::{
    Error, Result,
    config::Config,
    llm::OpenAiClient,
    pages,
    questions::QuestionStore,
    relay::{AiQuery, AiReply, FeedbackRelay, Persona, RelaySettings},
    runner::{CodeRunner, ExecutionRequest, RunCodeReply, SubprocessSandbox},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
};
use std::sync::Arc;
use tracing::{Instrument, error, info_span, warn};

#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<QuestionStore>,
    pub runner: Arc<CodeRunner>,
    pub relay: Arc<FeedbackRelay>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let llm_client = OpenAiClient::new(config.llm.clone())?;

        Ok(Self {
            questions: Arc::new(QuestionStore::new(&config.questions.path)),
            runner: Arc::new(CodeRunner::new(Arc::new(SubprocessSandbox::from_config(
                &config.runner,
            )))),
            relay: Arc::new(FeedbackRelay::new(
                Arc::new(llm_client),
                RelaySettings::from(&config.llm),
            )),
        })
    }
}

type PageResult = std::result::Result<Html<String>, (StatusCode, Html<String>)>;

const QUESTION_NOT_FOUND: &str = "Question not found";
const QUESTIONS_FILE_NOT_FOUND: &str = "Questions file not found!";

fn page_error(correlation_id: &CorrelationId, err: Error) -> (StatusCode, Html<String>) {
    match err {
        Error::QuestionNotFound { id } => {
            warn!(correlation_id = %correlation_id, question_id = id, "question not found");
            (
                StatusCode::NOT_FOUND,
                Html(pages::not_found(QUESTION_NOT_FOUND)),
            )
        }
        Error::DataUnavailable(reason) => {
            error!(correlation_id = %correlation_id, reason = %reason, "question data unavailable");
            (
                StatusCode::NOT_FOUND,
                Html(pages::not_found(QUESTIONS_FILE_NOT_FOUND)),
            )
        }
        other => {
            error!(correlation_id = %correlation_id, error = %other, "page rendering failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::not_found("Internal server error")),
            )
        }
    }
}

pub async fn dashboard(State(state): State<AppState>, correlation_id: CorrelationId) -> PageResult {
    let questions = state
        .questions
        .list_all()
        .await
        .map_err(|e| page_error(&correlation_id, e))?;

    Ok(Html(pages::dashboard(&questions)))
}

pub async fn about() -> Html<String> {
    Html(pages::about())
}

pub async fn question_page(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Path(raw_id): Path<String>,
) -> PageResult {
    // Non-integer ids cannot match any question.
    let Ok(id) = raw_id.parse::<i64>() else {
        warn!(correlation_id = %correlation_id, raw_id_len = raw_id.len(), "question not found");
        return Err((
            StatusCode::NOT_FOUND,
            Html(pages::not_found(QUESTION_NOT_FOUND)),
        ));
    };

    let question = state
        .questions
        .get_by_id(id)
        .await
        .and_then(|found| found.ok_or(Error::QuestionNotFound { id }))
        .map_err(|e| page_error(&correlation_id, e))?;

    Ok(Html(pages::editor(&question)))
}

pub async fn run_code(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<ExecutionRequest>,
) -> Json<RunCodeReply> {
    let span = info_span!("run_code", correlation_id = %correlation_id);
    let result = state.runner.run(&request).instrument(span).await;

    Json(RunCodeReply::from(result))
}

pub async fn ask_ai(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(query): Json<AiQuery>,
) -> Json<AiReply> {
    relay_reply(&state, Persona::Recruiter, &correlation_id, &query).await
}

pub async fn request_help(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(query): Json<AiQuery>,
) -> Json<AiReply> {
    relay_reply(&state, Persona::Hint, &correlation_id, &query).await
}

async fn relay_reply(
    state: &AppState,
    persona: Persona,
    correlation_id: &CorrelationId,
    query: &AiQuery,
) -> Json<AiReply> {
    let span = info_span!("relay", correlation_id = %correlation_id, persona = %persona);
    let result = state.relay.relay(persona, query).instrument(span).await;

    Json(AiReply::from_result(result))
}

pub async fn get_summary() -> Html<String> {
    Html(pages::summary())
}
