use std::net::SocketAddr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use ca_core::service::csr::dto::{FetchCertificateResponseDTO, SubmitCsrRequestDTO};

use super::dto::SubmitCsrResponseRestDTO;
use crate::dto::response::ErrorResponse;
use crate::router::AppState;

pub(crate) const PEM_CONTENT_TYPE: &str = "application/x-pem-file";

/// Accepts a PEM CSR whose SHA-256 is the last path segment, answers `202 Accepted` once stored
pub(crate) async fn post_csr(
    state: State<AppState>,
    Path(sha256): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let announced_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if !matches!(announced_length, Some(length) if length > 0) {
        return ErrorResponse::LengthRequired.into_response();
    }

    let result = state
        .core
        .csr_service
        .submit_csr(SubmitCsrRequestDTO {
            pem: body.to_vec(),
            sha256sum: sha256,
        })
        .await;

    match result {
        Ok(response) => {
            let url = format!(
                "{}/{}",
                state.config.core_base_url.trim_end_matches('/'),
                response.sha256sum
            );
            (
                StatusCode::ACCEPTED,
                Json(SubmitCsrResponseRestDTO {
                    sha256: response.sha256sum,
                    url,
                }),
            )
                .into_response()
        }
        Err(error) => {
            ErrorResponse::from_service_error_with_trace(error, "submitting CSR").into_response()
        }
    }
}

/// Current certificate of the CSR, `202 Accepted` while none is valid
pub(crate) async fn get_certificate(
    state: State<AppState>,
    Path(sha256): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    let result = state
        .core
        .csr_service
        .fetch_certificate(&sha256, peer.ip().to_string())
        .await;

    match result {
        Ok(FetchCertificateResponseDTO::Certificate(pem)) => {
            ([(header::CONTENT_TYPE, PEM_CONTENT_TYPE)], pem).into_response()
        }
        Ok(FetchCertificateResponseDTO::Pending) => StatusCode::ACCEPTED.into_response(),
        Err(error) => ErrorResponse::from_service_error_with_trace(error, "fetching certificate")
            .into_response(),
    }
}
