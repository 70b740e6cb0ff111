use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, Response};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use ca_core::CaCore;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{Span, info, info_span};

use crate::ServerConfig;
use crate::dto::response::ErrorResponse;
use crate::endpoint::{csr, misc};
use crate::middleware::get_http_request_context;

pub(crate) struct InternalAppState {
    pub core: CaCore,
    pub config: Arc<ServerConfig>,
}

pub(crate) type AppState = Arc<InternalAppState>;

/// Serves until ctrl-c
pub async fn start_server(
    listener: std::net::TcpListener,
    config: Arc<ServerConfig>,
    core: CaCore,
) -> std::io::Result<()> {
    listener.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(listener)?;

    let addr = listener.local_addr()?;
    info!("Starting server at http://{addr}");

    let state: AppState = Arc::new(InternalAppState { core, config });

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

pub(crate) fn router(state: AppState) -> Router {
    let max_length = state.core.config.submission.max_length;

    let submission = Router::new()
        .route(
            "/{sha256}",
            post(csr::controller::post_csr)
                .layer(DefaultBodyLimit::max(max_length))
                .get(csr::controller::get_certificate),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let context = get_http_request_context(request);
                    info_span!(
                        "http_request",
                        method = context.method,
                        path = context.path,
                    )
                })
                .on_request(|request: &Request<_>, _span: &Span| {
                    tracing::debug!(
                        "SERVICE CALL START {} {}",
                        request.method(),
                        request.uri().path()
                    )
                })
                .on_failure(|_, _, _: &_| {})
                .on_response(|response: &Response<_>, latency: Duration, _span: &Span| {
                    tracing::debug!(?latency, "SERVICE CALL END {}", response.status())
                }),
        );

    let technical_endpoints = Router::new()
        .route("/health", get(misc::health_check))
        .route("/metrics", get(misc::get_metrics));

    Router::new()
        .merge(submission)
        .layer(middleware::from_fn(crate::middleware::metrics_counter))
        .merge(technical_endpoints)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    tracing::error!("PANIC occurred in request: {message}");

    ErrorResponse::for_panic(message).into_response()
}

