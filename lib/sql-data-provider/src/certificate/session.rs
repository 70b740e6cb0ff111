use async_trait::async_trait;
use ca_core::model::certificate::Certificate;
use ca_core::model::csr::Csr;
use ca_core::repository::certificate_repository::SigningSession;
use ca_core::repository::error::DataLayerError;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QuerySelect, TransactionTrait,
};
use shared_types::CertificateId;

use crate::entity::{certificate, csr};
use crate::mapper::to_data_layer_error;

pub(crate) struct SqlSigningSession {
    pub db: DatabaseConnection,
    pub csr: Csr,
}

#[async_trait]
impl SigningSession for SqlSigningSession {
    fn csr(&self) -> &Csr {
        &self.csr
    }

    async fn commit(&self, certificate: Certificate) -> Result<CertificateId, DataLayerError> {
        let tx = self.db.begin().await.map_err(to_data_layer_error)?;

        let id = certificate::ActiveModel::from(certificate)
            .insert(&tx)
            .await
            .map_err(to_data_layer_error)?
            .id;

        // a rejection that landed while signing wins
        let rejected: Option<bool> = csr::Entity::find_by_id(self.csr.id)
            .select_only()
            .column(csr::Column::Rejected)
            .into_tuple()
            .one(&tx)
            .await
            .map_err(to_data_layer_error)?;

        if rejected != Some(false) {
            tx.rollback().await.map_err(to_data_layer_error)?;
            return Err(DataLayerError::RecordNotUpdated);
        }

        tx.commit().await.map_err(to_data_layer_error)?;

        Ok(id)
    }
}
