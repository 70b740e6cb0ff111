use thiserror::Error;

pub mod core_config;

#[derive(Debug, Error)]
pub enum ConfigParsingError {
    #[error("Config parsing error: `{0}`")]
    GeneralParsingError(String),
}

#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Lifetime `{0}` must be positive")]
    NonPositiveLifetime(&'static str),
    #[error("Short lifetime ({short}) exceeds long lifetime ({long})")]
    ShortExceedsLong {
        short: time::Duration,
        long: time::Duration,
    },
    #[error("Refresh concurrency must be at least 1")]
    InvalidConcurrency,
    #[error("Interval `{0}` must be positive")]
    NonPositiveInterval(&'static str),
    #[error("Unknown subject attribute `{0}`")]
    UnknownSubjectAttribute(String),
}
