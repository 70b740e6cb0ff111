use serde_json::Value;

use super::Task;
use crate::service::certificate::CertificateService;
use crate::service::error::ServiceError;

/// Signs pending CSRs whose common name is a UUID
pub(crate) struct Autosign {
    certificate_service: CertificateService,
}

impl Autosign {
    pub fn new(certificate_service: CertificateService) -> Self {
        Self {
            certificate_service,
        }
    }
}

#[async_trait::async_trait]
impl Task for Autosign {
    async fn run(&self) -> Result<Value, ServiceError> {
        let summary = self.certificate_service.autosign_all().await?;
        serde_json::to_value(summary).map_err(|e| ServiceError::MappingError(e.to_string()))
    }
}
