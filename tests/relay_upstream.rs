//! Drives the real OpenAI client against a stubbed chat-completion API.

use axum_test::TestServer;
use practice_server::{
    config::LlmConfig,
    llm::{ChatCompletionRequest, ChatMessage, LlmClient, OpenAiClient, Usage},
    relay::{AiQuery, FeedbackRelay, Persona, RelaySettings},
    server,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

mod common;

use common::mocks::StubSandbox;
use common::test_utils::{SAMPLE_QUESTIONS_JSON, build_state, create_questions_file};

fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "logprobs": null,
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49 }
    })
}

fn llm_config(mock_server: &MockServer, api_key: Option<&str>) -> LlmConfig {
    LlmConfig {
        base_url: format!("{}/v1", mock_server.uri()),
        api_key: api_key.map(str::to_string),
        request_timeout_secs: 5,
        ..LlmConfig::default()
    }
}

fn relay_for(config: LlmConfig) -> FeedbackRelay {
    let client = OpenAiClient::new(config.clone()).unwrap();
    FeedbackRelay::new(Arc::new(client), RelaySettings::from(&config))
}

fn sample_query() -> AiQuery {
    AiQuery {
        query: "Can this be faster?".to_string(),
        code: "def two_sum(nums, target):\n    return []".to_string(),
        problem_context: "Two Sum".to_string(),
    }
}

#[tokio::test]
async fn test_relay_returns_stubbed_text_trimmed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("\n  Consider a hash map.  \n")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let relay = relay_for(llm_config(&mock_server, Some("test-key")));
    let text = relay
        .relay(Persona::Recruiter, &sample_query())
        .await
        .unwrap();

    assert_eq!(text, "Consider a hash map.");
}

#[tokio::test]
async fn test_client_reports_token_usage() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new(llm_config(&mock_server, Some("test-key"))).unwrap();
    let response = client
        .create_chat_completion(ChatCompletionRequest {
            messages: vec![ChatMessage::user("hello")],
            max_tokens: Some(10),
            temperature: Some(0.7),
        })
        .await
        .unwrap();

    assert_eq!(
        response.usage,
        Some(Usage {
            prompt_tokens: 42,
            completion_tokens: 7,
            total_tokens: 49,
        })
    );
    assert_eq!(response.choices.len(), 1);
    assert_eq!(response.choices[0].message.content, "ok");
}

#[tokio::test]
async fn test_relay_sends_configured_parameters() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .mount(&mock_server)
        .await;

    let relay = relay_for(llm_config(&mock_server, Some("test-key")));
    relay.relay(Persona::Hint, &sample_query()).await.unwrap();

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);

    let body: Value = received[0].body_json().unwrap();
    assert_eq!(body["model"], json!("gpt-3.5-turbo"));
    assert_eq!(body["max_tokens"], json!(500));
    let temperature = body["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], json!("system"));
    assert_eq!(messages[0]["content"], json!(Persona::Hint.system_prompt()));
    assert_eq!(messages[1]["role"], json!("user"));
    let user_turn = messages[1]["content"].as_str().unwrap();
    assert!(user_turn.contains("### Problem:\nTwo Sum"));
    assert!(user_turn.contains("### Candidate's Query:\nCan this be faster?"));
}

#[tokio::test]
async fn test_upstream_auth_failure_is_single_attempt() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let relay = relay_for(llm_config(&mock_server, Some("wrong-key")));
    let err = relay
        .relay(Persona::Recruiter, &sample_query())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Incorrect API key provided"));
}

#[rstest]
#[case::server_error(500, "server_error")]
#[case::rate_limited(429, "rate_limit_exceeded")]
#[tokio::test]
async fn test_transient_upstream_failure_is_not_retried(
    #[case] status: u16,
    #[case] code: &str,
) {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": {
                "message": "The server is busy",
                "type": code,
                "param": null,
                "code": code
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let relay = relay_for(llm_config(&mock_server, Some("test-key")));
    let started = Instant::now();
    let result = relay.relay(Persona::Hint, &sample_query()).await;
    let elapsed = started.elapsed();

    assert!(result.is_err());
    assert!(
        elapsed < Duration::from_secs(1),
        "status {} took {:?}, a retry loop is still active",
        status,
        elapsed
    );
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_upstream_response_is_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&mock_server)
        .await;

    let relay = relay_for(llm_config(&mock_server, Some("test-key")));
    assert!(relay.relay(Persona::Hint, &sample_query()).await.is_err());
}

#[tokio::test]
async fn test_missing_api_key_makes_no_upstream_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let relay = relay_for(llm_config(&mock_server, None));
    let err = relay
        .relay(Persona::Recruiter, &sample_query())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_endpoints_relay_stubbed_text_over_http() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Fixed answer.")))
        .mount(&mock_server)
        .await;

    let (_temp_dir, questions_path) = create_questions_file(SAMPLE_QUESTIONS_JSON);
    let config = llm_config(&mock_server, Some("test-key"));
    let state = build_state(
        &questions_path,
        Arc::new(StubSandbox::printing("")),
        Arc::new(OpenAiClient::new(config).unwrap()),
    );
    let server = TestServer::new(server::router(state)).unwrap();

    for uri in ["/ask_ai", "/request_help"] {
        let response = server
            .post(uri)
            .json(&json!({ "query": "anything", "code": "x = 1", "problem_context": "Two Sum" }))
            .await;
        assert_eq!(response.json::<Value>(), json!({ "response": "Fixed answer." }));
    }
}

#[tokio::test]
async fn test_missing_api_key_over_http_is_authorization_error() {
    let mock_server = MockServer::start().await;
    let (_temp_dir, questions_path) = create_questions_file(SAMPLE_QUESTIONS_JSON);
    let state = build_state(
        &questions_path,
        Arc::new(StubSandbox::printing("")),
        Arc::new(OpenAiClient::new(llm_config(&mock_server, None)).unwrap()),
    );
    let server = TestServer::new(server::router(state)).unwrap();

    let response = server
        .post("/ask_ai")
        .json(&json!({ "query": "hi", "code": "", "problem_context": "" }))
        .await;

    let body: Value = response.json();
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("OpenAI API error: Missing API key"));
}
