use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::metrics::encode_metrics;

pub(crate) async fn health_check() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub(crate) async fn get_metrics() -> Response {
    match encode_metrics() {
        Ok(result) => (StatusCode::OK, result).into_response(),
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Metrics encoding error: {error:?}"),
        )
            .into_response(),
    }
}
