use one_dto_mapper::convert_inner;
use sha2::{Digest, Sha256};
use shared_types::{AccessLogId, CsrId};

use super::CsrService;
use super::dto::{
    CsrDetailResponseDTO, CsrListItemResponseDTO, FetchCertificateResponseDTO,
    SubmitCsrRequestDTO, SubmitCsrResponseDTO,
};
use super::mapper::csr_detail_from_model;
use crate::model::access_log::AccessLog;
use crate::model::certificate::CertificateRelations;
use crate::model::csr::CsrRelations;
use crate::model::subject_alt_name::SubjectAltNameRelations;
use crate::proto::certificate_request::{CertificateRequest, format_subject};
use crate::repository::error::DataLayerError;
use crate::service::error::{
    BusinessLogicError, EntityAlreadyExistsError, EntityNotFoundError, ServiceError,
    ValidationError,
};

impl CsrService {
    /// Validates and stores a new CSR.
    ///
    /// The PEM must hash to the announced fingerprint, round-trip byte-for-byte and carry
    /// a subject starting with the configured CA subject prefix.
    pub async fn submit_csr(
        &self,
        request: SubmitCsrRequestDTO,
    ) -> Result<SubmitCsrResponseDTO, ServiceError> {
        let max = self.config.submission.max_length;
        if request.pem.len() > max {
            return Err(ValidationError::CsrTooLarge {
                size: request.pem.len(),
                max,
            }
            .into());
        }

        let computed = hex::encode(Sha256::digest(&request.pem));
        if computed != request.sha256sum {
            return Err(ValidationError::FingerprintMismatch {
                claimed: request.sha256sum,
                computed,
            }
            .into());
        }

        let parsed = CertificateRequest::parse(&request.pem)?;

        let prefix = self
            .signing_cert
            .subject_prefix(&self.config.ca.subject_prefix);
        if !parsed.subject_starts_with(&prefix) {
            return Err(ValidationError::SubjectPrefixMismatch {
                subject: format_subject(parsed.subject()),
                prefix: format_subject(&prefix),
            }
            .into());
        }

        if self
            .csr_repository
            .get_csr_by_sha256sum(&computed, &CsrRelations::default())
            .await?
            .is_some()
        {
            return Err(EntityAlreadyExistsError::Csr(computed).into());
        }

        let csr = parsed.to_csr(computed.to_owned(), self.clock.now_utc())?;
        let id = self
            .csr_repository
            .create_csr(csr)
            .await
            .map_err(|err| match err {
                DataLayerError::AlreadyExists => {
                    ServiceError::from(EntityAlreadyExistsError::Csr(computed.to_owned()))
                }
                err => err.into(),
            })?;

        tracing::info!(
            csr = %computed,
            commonname = parsed.commonname(),
            "Accepted certificate signing request"
        );

        Ok(SubmitCsrResponseDTO {
            id,
            sha256sum: computed,
        })
    }

    /// Current certificate of the CSR with fingerprint `sha256sum`.
    ///
    /// Every lookup of a known CSR is recorded with the requesting `addr`.
    pub async fn fetch_certificate(
        &self,
        sha256sum: &str,
        addr: String,
    ) -> Result<FetchCertificateResponseDTO, ServiceError> {
        let csr = self
            .csr_repository
            .get_csr_by_sha256sum(
                sha256sum,
                &CsrRelations {
                    certificates: Some(CertificateRelations::default()),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| EntityNotFoundError::CsrFingerprint(sha256sum.to_owned()))?;

        let now = self.clock.now_utc();
        self.access_log_repository
            .create_access_log(AccessLog {
                id: AccessLogId::new_random(),
                csr_id: csr.id,
                when: now,
                addr,
            })
            .await?;

        if csr.rejected {
            return Err(BusinessLogicError::CsrRejected(csr.sha256sum).into());
        }

        Ok(match csr.current_certificate() {
            Some(certificate) if certificate.lifetime().is_valid_at(now) => {
                FetchCertificateResponseDTO::Certificate(certificate.pem.to_owned())
            }
            _ => FetchCertificateResponseDTO::Pending,
        })
    }

    pub async fn get_csr_list(&self) -> Result<Vec<CsrListItemResponseDTO>, ServiceError> {
        Ok(convert_inner(self.csr_repository.get_csr_list().await?))
    }

    pub async fn get_csr(&self, id: &CsrId) -> Result<CsrDetailResponseDTO, ServiceError> {
        let csr = self
            .csr_repository
            .get_csr(
                id,
                &CsrRelations {
                    subject_alt_names: Some(SubjectAltNameRelations::default()),
                    certificates: Some(CertificateRelations::default()),
                },
            )
            .await?
            .ok_or(EntityNotFoundError::Csr(*id))?;

        let access_log = self
            .access_log_repository
            .get_access_log_list(id)
            .await?;

        csr_detail_from_model(csr, access_log)
    }

    /// Marks the CSR rejected, it will never be signed or refreshed again
    pub async fn reject_csr(&self, id: &CsrId) -> Result<(), ServiceError> {
        let csr = self
            .csr_repository
            .get_csr(id, &CsrRelations::default())
            .await?
            .ok_or(EntityNotFoundError::Csr(*id))?;

        self.csr_repository.reject_csr(id).await?;

        tracing::info!(csr = %csr.sha256sum, "Rejected certificate signing request");
        Ok(())
    }
}
