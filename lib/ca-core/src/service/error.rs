use shared_types::CsrId;
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::ConfigValidationError;
use crate::model::subject_alt_name::SubjectAltNameKind;
use crate::repository::error::DataLayerError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Mapping error: `{0}`")]
    MappingError(String),
    #[error("Config validation error `{0}`")]
    ConfigValidationError(#[from] ConfigValidationError),

    #[error(transparent)]
    EntityNotFound(#[from] EntityNotFoundError),
    #[error(transparent)]
    EntityAlreadyExists(#[from] EntityAlreadyExistsError),
    #[error(transparent)]
    BusinessLogic(#[from] BusinessLogicError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),
    #[error(transparent)]
    Repository(DataLayerError),
}

#[derive(Debug, Error)]
pub enum EntityNotFoundError {
    #[error("CSR `{0}` not found")]
    Csr(CsrId),
    #[error("CSR with fingerprint `{0}` not found")]
    CsrFingerprint(String),
    #[error("Task `{0}` not found")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum EntityAlreadyExistsError {
    #[error("CSR with fingerprint `{0}` already exists")]
    Csr(String),
}

/// Lifecycle rule violations
#[derive(Debug, Error)]
pub enum BusinessLogicError {
    #[error("CSR `{0}` is rejected")]
    CsrRejected(String),

    #[error("Unsupported key: {reason}")]
    UnsupportedKey { reason: String },

    #[error(
        "Current certificate is valid until {not_after}, past the requested lifetime: remove the outstanding long-lived certificate first"
    )]
    LongLivedCertificateOutstanding { not_after: OffsetDateTime },

    #[error("Backdating requires the long lifetime")]
    BackdateRequiresLongLifetime,

    #[error("Issued certificate failed validation: {0}")]
    IssuedCertificateInvalid(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid CSR: {0}")]
    InvalidCsr(String),

    #[error("CSR fingerprint mismatch: claimed `{claimed}`, computed `{computed}`")]
    FingerprintMismatch { claimed: String, computed: String },

    #[error("CSR subject `{subject}` does not start with `{prefix}`")]
    SubjectPrefixMismatch { subject: String, prefix: String },

    #[error("CSR too large: {size} bytes, at most {max} accepted")]
    CsrTooLarge { size: usize, max: usize },

    #[error("Invalid {kind} subject alternative name `{value}`: {reason}")]
    InvalidSubjectAltName {
        kind: SubjectAltNameKind,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("Signing key error: {0}")]
    SigningKey(String),

    #[error("Signing certificate error: {0}")]
    SigningCertificate(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
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

impl ErrorCode {
    pub const fn msg(&self) -> &'static str {
        match self {
            ErrorCode::BR_0000 => "Unmapped error code",
            ErrorCode::BR_0001 => "CSR not found",
            ErrorCode::BR_0002 => "CSR already exists",
            ErrorCode::BR_0003 => "Invalid CSR",
            ErrorCode::BR_0004 => "CSR fingerprint mismatch",
            ErrorCode::BR_0005 => "CSR subject not accepted by this CA",
            ErrorCode::BR_0006 => "Invalid subject alternative name",
            ErrorCode::BR_0007 => "CSR too large",
            ErrorCode::BR_0008 => "CSR rejected",
            ErrorCode::BR_0009 => "Unsupported key",
            ErrorCode::BR_0010 => "Long-lived certificate outstanding",
            ErrorCode::BR_0011 => "Backdating requires the long lifetime",
            ErrorCode::BR_0012 => "Issued certificate invalid",
            ErrorCode::BR_0013 => "Signing identity error",
            ErrorCode::BR_0014 => "Database error",
            ErrorCode::BR_0015 => "Configuration error",
            ErrorCode::BR_0016 => "Task not found",
            ErrorCode::BR_0017 => "Mapping error",
        }
    }
}

impl ServiceError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ServiceError::EntityNotFound(error) => error.error_code(),
            ServiceError::EntityAlreadyExists(error) => error.error_code(),
            ServiceError::BusinessLogic(error) => error.error_code(),
            ServiceError::Validation(error) => error.error_code(),
            ServiceError::Infrastructure(_) => ErrorCode::BR_0013,
            ServiceError::Repository(error) => error.error_code(),
            ServiceError::ConfigValidationError(_) => ErrorCode::BR_0015,
            ServiceError::MappingError(_) => ErrorCode::BR_0017,
        }
    }
}

impl EntityNotFoundError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            EntityNotFoundError::Csr(_) | EntityNotFoundError::CsrFingerprint(_) => {
                ErrorCode::BR_0001
            }
            EntityNotFoundError::Task(_) => ErrorCode::BR_0016,
        }
    }
}

impl EntityAlreadyExistsError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            EntityAlreadyExistsError::Csr(_) => ErrorCode::BR_0002,
        }
    }
}

impl BusinessLogicError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            BusinessLogicError::CsrRejected(_) => ErrorCode::BR_0008,
            BusinessLogicError::UnsupportedKey { .. } => ErrorCode::BR_0009,
            BusinessLogicError::LongLivedCertificateOutstanding { .. } => ErrorCode::BR_0010,
            BusinessLogicError::BackdateRequiresLongLifetime => ErrorCode::BR_0011,
            BusinessLogicError::IssuedCertificateInvalid(_) => ErrorCode::BR_0012,
        }
    }
}

impl ValidationError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ValidationError::InvalidCsr(_) => ErrorCode::BR_0003,
            ValidationError::FingerprintMismatch { .. } => ErrorCode::BR_0004,
            ValidationError::SubjectPrefixMismatch { .. } => ErrorCode::BR_0005,
            ValidationError::CsrTooLarge { .. } => ErrorCode::BR_0007,
            ValidationError::InvalidSubjectAltName { .. } => ErrorCode::BR_0006,
        }
    }
}

impl From<DataLayerError> for ServiceError {
    fn from(value: DataLayerError) -> Self {
        Self::Repository(value)
    }
}

impl From<uuid::Error> for ServiceError {
    fn from(value: uuid::Error) -> Self {
        ServiceError::MappingError(value.to_string())
    }
}
