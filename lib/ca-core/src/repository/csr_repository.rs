use async_trait::async_trait;
use shared_types::CsrId;

use crate::model::csr::{Csr, CsrListItem, CsrRelations};
use crate::repository::error::DataLayerError;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CsrRepository: Send + Sync {
    /// Stores the CSR together with its subject alternative names
    async fn create_csr(&self, request: Csr) -> Result<CsrId, DataLayerError>;

    async fn get_csr(
        &self,
        id: &CsrId,
        relations: &CsrRelations,
    ) -> Result<Option<Csr>, DataLayerError>;

    async fn get_csr_by_sha256sum(
        &self,
        sha256sum: &str,
        relations: &CsrRelations,
    ) -> Result<Option<Csr>, DataLayerError>;

    /// Non-rejected CSRs with at least one certificate
    async fn get_refreshable_csrs(&self) -> Result<Vec<Csr>, DataLayerError>;

    /// Non-rejected CSRs without certificates
    async fn get_unsigned_csrs(&self) -> Result<Vec<Csr>, DataLayerError>;

    async fn count_unsigned_csrs(&self) -> Result<u64, DataLayerError>;

    /// Non-rejected CSRs with the expiry of their current certificate
    async fn get_csr_list(&self) -> Result<Vec<CsrListItem>, DataLayerError>;

    /// Sets the rejected flag, rejecting an already rejected CSR is not an error
    async fn reject_csr(&self, id: &CsrId) -> Result<(), DataLayerError>;
}
