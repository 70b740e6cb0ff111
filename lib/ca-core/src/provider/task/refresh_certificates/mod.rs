use serde_json::Value;

use super::Task;
use crate::service::certificate::CertificateService;
use crate::service::error::ServiceError;

/// One half-life refresh pass over all signed CSRs
pub(crate) struct RefreshCertificates {
    certificate_service: CertificateService,
}

impl RefreshCertificates {
    pub fn new(certificate_service: CertificateService) -> Self {
        Self {
            certificate_service,
        }
    }
}

#[async_trait::async_trait]
impl Task for RefreshCertificates {
    async fn run(&self) -> Result<Value, ServiceError> {
        let summary = self.certificate_service.refresh_all().await?;
        serde_json::to_value(summary).map_err(|e| ServiceError::MappingError(e.to_string()))
    }
}
