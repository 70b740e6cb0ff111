use ca_core::service::error::ServiceError;
use one_dto_mapper::From;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize, From)]
#[from("ca_core::service::error::ErrorCode")]
#[allow(non_camel_case_types)]
pub enum ErrorCode {
    BR_0000,
    BR_0001,
    BR_0002,
    BR_0003,
    BR_0004,
    BR_0005,
    BR_0006,
    BR_0007,
    BR_0008,
    BR_0009,
    BR_0010,
    BR_0011,
    BR_0012,
    BR_0013,
    BR_0014,
    BR_0015,
    BR_0016,
    BR_0017,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponseRestDTO {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&ServiceError> for ErrorResponseRestDTO {
    fn from(error: &ServiceError) -> Self {
        let code = error.error_code();
        Self {
            code: code.into(),
            message: format!("{}: {error}", code.msg()),
        }
    }
}
