use std::sync::Arc;

use crate::config::core_config::CoreConfig;
use crate::proto::clock::Clock;
use crate::proto::signing_cert::SigningCert;
use crate::repository::access_log_repository::AccessLogRepository;
use crate::repository::csr_repository::CsrRepository;

pub mod dto;
pub(crate) mod mapper;
pub mod service;

#[derive(Clone)]
pub struct CsrService {
    csr_repository: Arc<dyn CsrRepository>,
    access_log_repository: Arc<dyn AccessLogRepository>,
    signing_cert: Arc<SigningCert>,
    clock: Arc<dyn Clock>,
    config: Arc<CoreConfig>,
}

impl CsrService {
    pub fn new(
        csr_repository: Arc<dyn CsrRepository>,
            access_log_repository: Arc<dyn AccessLogRepository>,
        signing_cert: Arc<SigningCert>,
        clock: Arc<dyn Clock>,
        config: Arc<CoreConfig>,
    ) -> Self {
        Self {
            csr_repository,
            access_log_repository,
            signing_cert,
            clock,
            config,
        }
    }
}

#[cfg(test)]
mod test;
