use std::collections::HashMap;

use async_trait::async_trait;
use shared_types::{CertificateId, CsrId};

use crate::model::certificate::{Certificate, CertificateLifetime};
use crate::model::csr::Csr;
use crate::repository::error::DataLayerError;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Fails with [`DataLayerError::MissingRequiredRelation`] for an unknown CSR
    async fn open_signing_session(
        &self,
        csr_id: &CsrId,
    ) -> Result<Box<dyn SigningSession>, DataLayerError>;

    /// Validity window of the current certificate of every CSR that has one
    async fn get_latest_lifetimes(
        &self,
    ) -> Result<HashMap<CsrId, CertificateLifetime>, DataLayerError>;

    /// Newest `not_after` first
    async fn get_certificate_list(
        &self,
        csr_id: &CsrId,
    ) -> Result<Vec<Certificate>, DataLayerError>;

    /// Deletes all certificates of the CSR except the current one
    async fn delete_superseded_certificates(&self, csr_id: &CsrId) -> Result<u64, DataLayerError>;

    /// [`CertificateRepository::delete_superseded_certificates`] for every CSR, in one transaction
    async fn delete_all_superseded_certificates(&self) -> Result<u64, DataLayerError>;

    async fn delete_all_certificates(&self, csr_id: &CsrId) -> Result<u64, DataLayerError>;
}

/// Snapshot of one CSR, taken for a single signing.
///
/// Nothing is written until [`SigningSession::commit`]. Dropping an uncommitted session discards it.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait SigningSession: Send + Sync {
    /// The CSR with its subject alternative names and certificates loaded
    fn csr(&self) -> &Csr;

    /// Appends `certificate` to the CSR history. Fails with
    /// [`DataLayerError::RecordNotUpdated`] if the CSR got rejected after the session was opened.
    async fn commit(&self, certificate: Certificate) -> Result<CertificateId, DataLayerError>;
}
