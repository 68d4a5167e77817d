pub mod handlers;
mod telemetry;

pub use handlers::AppState;
pub use telemetry::{ClientRequestId, CorrelationId, RequestCompletion, RequestSpan};

use crate::{Result, config::Config};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Builds the full route table with request-id and tracing middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/about", get(handlers::about))
        .route("/question/:id", get(handlers::question_page))
        .route("/run_code", post(handlers::run_code))
        .route("/ask_ai", post(handlers::ask_ai))
        .route("/request_help", post(handlers::request_help))
        .route("/get_summary", get(handlers::get_summary))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::map_request(telemetry::detach_client_request_id))
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(RequestSpan)
                        .on_response(RequestCompletion),
                ),
        )
}

pub async fn run(config: Config) -> Result<()> {
    let app_state = AppState::from_config(&config)?;
    let app = router(app_state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);
    info!("Serving questions from {}", config.questions.path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
