use std::sync::Arc;

use crate::config::core_config::CoreConfig;
use crate::proto::certificate_signer::CertificateSigner;
use crate::proto::clock::Clock;
use crate::proto::refresh_scheduler::RefreshScheduler;
use crate::proto::signing_cert::SigningCert;
use crate::repository::certificate_repository::CertificateRepository;
use crate::repository::csr_repository::CsrRepository;

pub mod dto;
pub mod service;

#[derive(Clone)]
pub struct CertificateService {
    csr_repository: Arc<dyn CsrRepository>,
    certificate_repository: Arc<dyn CertificateRepository>,
    signer: Arc<dyn CertificateSigner>,
    scheduler: Arc<RefreshScheduler>,
    signing_cert: Arc<SigningCert>,
    clock: Arc<dyn Clock>,
    config: Arc<CoreConfig>,
}

impl CertificateService {
    pub fn new(
        csr_repository: Arc<dyn CsrRepository>,
        certificate_repository: Arc<dyn CertificateRepository>,
        signer: Arc<dyn CertificateSigner>,
        signing_cert: Arc<SigningCert>,
        clock: Arc<dyn Clock>,
        config: Arc<CoreConfig>,
    ) -> Self {
        let scheduler = Arc::new(RefreshScheduler::new(
            csr_repository.clone(),
            certificate_repository.clone(),
            signer.clone(),
            clock.clone(),
            config.refresh.concurrency,
        ));

        Self {
            csr_repository,
            certificate_repository,
            signer,
            scheduler,
            signing_cert,
            clock,
            config,
        }
    }
}
