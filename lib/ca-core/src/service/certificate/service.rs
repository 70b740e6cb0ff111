use shared_types::CsrId;
use time::Duration;

use super::CertificateService;
use super::dto::SignedCertificateResponseDTO;
use crate::model::csr::CsrRelations;
use crate::proto::certificate_signer::issue;
use crate::proto::refresh_policy::SigningTarget;
use crate::proto::refresh_scheduler::{AutosignSummary, RefreshSummary};
use crate::repository::error::DataLayerError;
use crate::service::error::{BusinessLogicError, EntityNotFoundError, ServiceError};

impl CertificateService {
    /// Manual signing with an explicit lifetime.
    ///
    /// Refuses to shorten an outstanding certificate and to backdate anything but the long lifetime.
    pub async fn sign_csr(
        &self,
        id: &CsrId,
        lifetime: Duration,
        backdate: bool,
    ) -> Result<SignedCertificateResponseDTO, ServiceError> {
        let session = self
            .certificate_repository
            .open_signing_session(id)
            .await
            .map_err(|err| match err {
                DataLayerError::MissingRequiredRelation { .. } => {
                    ServiceError::from(EntityNotFoundError::Csr(*id))
                }
                err => err.into(),
            })?;

        let csr = session.csr();
        if csr.rejected {
            return Err(BusinessLogicError::CsrRejected(csr.sha256sum.to_owned()).into());
        }

        let current = csr.current_certificate().map(|certificate| certificate.lifetime());
        self.config.refresh_policy().check_manual(
            current.as_ref(),
            &SigningTarget { lifetime, backdate },
            self.clock.now_utc(),
        )?;

        let certificate = issue(
            self.signer.clone(),
            session,
            self.signing_cert.clone(),
            lifetime,
            backdate,
        )
        .await?;

        Ok(certificate.into())
    }

    /// Manual signing with the configured lifetimes: `long` selects the long lifetime
    /// together with the configured backdating, otherwise the short one without.
    pub async fn sign_csr_with_policy(
        &self,
        id: &CsrId,
        long: bool,
    ) -> Result<SignedCertificateResponseDTO, ServiceError> {
        let target = self.config.refresh_policy().manual_target(long);
        self.sign_csr(id, target.lifetime, target.backdate).await
    }

    /// Deletes all certificates but the current one, returns the number deleted
    pub async fn clean_csr(&self, id: &CsrId) -> Result<u64, ServiceError> {
        let csr = self.get_csr_fingerprint(id).await?;

        let deleted = self
            .certificate_repository
            .delete_superseded_certificates(id)
            .await?;

        tracing::info!(csr = %csr, deleted, "Removed superseded certificates");
        Ok(deleted)
    }

    /// [`Self::clean_csr`] for all CSRs, returns the number deleted
    pub async fn clean_all(&self) -> Result<u64, ServiceError> {
        let deleted = self
            .certificate_repository
            .delete_all_superseded_certificates()
            .await?;

        tracing::info!(deleted, "Removed superseded certificates of all CSRs");
        Ok(deleted)
    }

    /// Deletes every certificate, the CSR itself stays and becomes unsigned
    pub async fn wipe_csr(&self, id: &CsrId) -> Result<u64, ServiceError> {
        let csr = self.get_csr_fingerprint(id).await?;

        let deleted = self
            .certificate_repository
            .delete_all_certificates(id)
            .await?;

        tracing::info!(csr = %csr, deleted, "Removed all certificates");
        Ok(deleted)
    }

    pub async fn refresh_all(&self) -> Result<RefreshSummary, ServiceError> {
        self.scheduler
            .refresh_all(self.signing_cert.clone(), self.config.refresh_policy())
            .await
    }

    pub async fn autosign_all(&self) -> Result<AutosignSummary, ServiceError> {
        self.scheduler
            .autosign_all(self.signing_cert.clone(), self.config.lifetime.short)
            .await
    }

    async fn get_csr_fingerprint(&self, id: &CsrId) -> Result<String, ServiceError> {
        Ok(self
            .csr_repository
            .get_csr(id, &CsrRelations::default())
            .await?
            .ok_or(EntityNotFoundError::Csr(*id))?
            .sha256sum)
    }
}
