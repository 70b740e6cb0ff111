use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use ca_core::service::error::{ErrorCode, ServiceError};

use super::error::ErrorResponseRestDTO;

pub(crate) enum ErrorResponse {
    BadRequest(ErrorResponseRestDTO),
    Forbidden(ErrorResponseRestDTO),
    NotFound(ErrorResponseRestDTO),
    LengthRequired,
    PayloadTooLarge(ErrorResponseRestDTO),
    ServerError(ErrorResponseRestDTO),
}

impl ErrorResponse {
    pub fn for_panic(panic_msg: String) -> Self {
        Self::ServerError(ErrorResponseRestDTO {
            code: ErrorCode::BR_0000.into(),
            message: panic_msg,
        })
    }

    pub fn from_service_error(error: &ServiceError) -> Self {
        let response = ErrorResponseRestDTO::from(error);
        match error.error_code() {
            ErrorCode::BR_0001 | ErrorCode::BR_0016 => Self::NotFound(response),
            ErrorCode::BR_0008 => Self::Forbidden(response),
            ErrorCode::BR_0007 => Self::PayloadTooLarge(response),
            ErrorCode::BR_0002
            | ErrorCode::BR_0003
            | ErrorCode::BR_0004
            | ErrorCode::BR_0005
            | ErrorCode::BR_0006
            | ErrorCode::BR_0009
            | ErrorCode::BR_0010
            | ErrorCode::BR_0011 => Self::BadRequest(response),
            ErrorCode::BR_0000
            | ErrorCode::BR_0012
            | ErrorCode::BR_0013
            | ErrorCode::BR_0014
            | ErrorCode::BR_0015
            | ErrorCode::BR_0017 => Self::ServerError(response),
        }
    }

    #[track_caller]
    pub fn from_service_error_with_trace(error: ServiceError, action_description: &str) -> Self {
        let location = std::panic::Location::caller();
        let response = Self::from_service_error(&error);
        if matches!(response, Self::ServerError(_)) {
            tracing::error!(%error, %location, "Error while {action_description}");
        } else {
            tracing::info!(%error, "Refused {action_description}");
        }
        response
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::BadRequest(error) => (StatusCode::BAD_REQUEST, Json(error)).into_response(),
            Self::Forbidden(error) => (StatusCode::FORBIDDEN, Json(error)).into_response(),
            Self::NotFound(error) => (StatusCode::NOT_FOUND, Json(error)).into_response(),
            Self::LengthRequired => StatusCode::LENGTH_REQUIRED.into_response(),
            Self::PayloadTooLarge(error) => {
                (StatusCode::PAYLOAD_TOO_LARGE, Json(error)).into_response()
            }
            Self::ServerError(error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            }
        }
    }
}
