use std::sync::Arc;

use config::core_config::CoreConfig;
use proto::certificate_signer::CertificateSignerImpl;
use proto::clock::{Clock, DefaultClock};
use proto::signing_cert::SigningCert;
use provider::task::provider::TaskProviderImpl;
use repository::DataRepository;
use service::certificate::CertificateService;
use service::csr::CsrService;
use service::error::ServiceError;
use service::task::TaskService;

pub mod config;
pub mod model;
pub mod proto;
pub mod provider;
pub mod repository;
pub mod service;

mod util;

#[cfg(test)]
mod test_data;

#[derive(Clone)]
pub struct CaCore {
    pub csr_service: CsrService,
    pub certificate_service: CertificateService,
    pub task_service: TaskService,
    pub config: Arc<CoreConfig>,
}

impl CaCore {
    /// Validates `config` and loads the CA certificate and key it names
    pub async fn new(
        data_repository: Arc<dyn DataRepository>,
        config: CoreConfig,
    ) -> Result<Self, ServiceError> {
        config.validate()?;

        let signing_cert = SigningCert::load(&config.ca.certificate, &config.ca.key).await?;
        tracing::info!(
            subject = %proto::certificate_request::format_subject(signing_cert.subject()),
            "CA identity loaded"
        );

        Ok(Self::with_signing_cert(
            data_repository,
            config,
            signing_cert,
            Arc::new(DefaultClock),
        ))
    }

    pub fn with_signing_cert(
        data_repository: Arc<dyn DataRepository>,
        config: CoreConfig,
        signing_cert: SigningCert,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = Arc::new(config);
        let signing_cert = Arc::new(signing_cert);

        let csr_repository = data_repository.get_csr_repository();
        let certificate_repository = data_repository.get_certificate_repository();
        let access_log_repository = data_repository.get_access_log_repository();

        let signer = Arc::new(CertificateSignerImpl::new(clock.clone()));

        let csr_service = CsrService::new(
            csr_repository.clone(),
            access_log_repository,
            signing_cert.clone(),
            clock.clone(),
            config.clone(),
        );

        let certificate_service = CertificateService::new(
            csr_repository,
            certificate_repository,
            signer,
            signing_cert,
            clock,
            config.clone(),
        );

        let task_provider = TaskProviderImpl::new(provider::task::tasks(
            certificate_service.clone(),
        ));

        Self {
            csr_service,
            certificate_service,
            task_service: TaskService::new(Arc::new(task_provider)),
            config,
        }
    }
}
