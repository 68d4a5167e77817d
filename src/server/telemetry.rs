use axum::{
    async_trait,
    extract::{self, ConnectInfo, FromRequestParts},
    http::{HeaderName, Request, Response, request::Parts},
};
use std::{convert::Infallible, fmt, net::SocketAddr, time::Duration};
use tower_http::{
    request_id::RequestId,
    trace::{MakeSpan, OnResponse},
};
use tracing::{Span, info, info_span};
use uuid::Uuid;

/// Per-request identifier linking every log event of one request.
///
/// Set by `SetRequestIdLayer` and handed to handlers as an extractor, so
/// domain code receives it explicitly instead of reading ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_request_id(request_id: &RequestId) -> Option<Self> {
        request_id
            .header_value()
            .to_str()
            .ok()
            .map(|value| Self(value.to_string()))
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestId>()
            .and_then(CorrelationId::from_request_id)
            .unwrap_or_else(CorrelationId::generate))
    }
}

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The `x-request-id` a client sent, kept for log correlation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRequestId(pub String);

/// Moves any client-supplied `x-request-id` aside so `SetRequestIdLayer`
/// always mints a fresh id for the request.
pub async fn detach_client_request_id(mut request: extract::Request) -> extract::Request {
    if let Some(value) = request.headers_mut().remove(X_REQUEST_ID) {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        request.extensions_mut().insert(ClientRequestId(value));
    }
    request
}

/// Opens the per-request span carrying the correlation id and client info.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let correlation_id = request
            .extensions()
            .get::<RequestId>()
            .and_then(CorrelationId::from_request_id)
            .unwrap_or_else(CorrelationId::generate);

        let client = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let client_request_id = request
            .extensions()
            .get::<ClientRequestId>()
            .map(|ClientRequestId(id)| id.as_str());

        info_span!(
            "request",
            correlation_id = %correlation_id,
            method = %request.method(),
            path = %request.uri().path(),
            client = %client,
            client_request_id,
        )
    }
}

/// Emits the single per-request completion record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestCompletion;

impl<B> OnResponse<B> for RequestCompletion {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        info!(
            status = response.status().as_u16(),
            duration_ms = latency.as_millis() as u64,
            "request completed"
        );
    }
}
