use std::collections::HashMap;

use async_trait::async_trait;
use autometrics::autometrics;
use ca_core::model::certificate::{Certificate, CertificateLifetime, CertificateRelations};
use ca_core::model::csr::CsrRelations;
use ca_core::model::subject_alt_name::SubjectAltNameRelations;
use ca_core::repository::certificate_repository::{CertificateRepository, SigningSession};
use ca_core::repository::error::DataLayerError;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use shared_types::{CertificateId, CsrId};

use super::session::SqlSigningSession;
use super::{CertificateProvider, latest_lifetimes};
use crate::csr::repository::load_relations;
use crate::entity::{certificate, csr};
use crate::mapper::to_data_layer_error;

#[autometrics]
#[async_trait]
impl CertificateRepository for CertificateProvider {
    async fn open_signing_session(
        &self,
        csr_id: &CsrId,
    ) -> Result<Box<dyn SigningSession>, DataLayerError> {
        let model = csr::Entity::find_by_id(csr_id)
            .one(&self.db)
            .await
            .map_err(to_data_layer_error)?
            .ok_or(DataLayerError::MissingRequiredRelation {
                relation: "csr",
                id: csr_id.to_string(),
            })?;

        let csr = load_relations(
            &self.db,
            model,
            &CsrRelations {
                subject_alt_names: Some(SubjectAltNameRelations::default()),
                certificates: Some(CertificateRelations::default()),
            },
        )
        .await?;

        Ok(Box::new(SqlSigningSession {
            db: self.db.clone(),
            csr,
        }) as Box<dyn SigningSession>)
    }

    async fn get_latest_lifetimes(
        &self,
    ) -> Result<HashMap<CsrId, CertificateLifetime>, DataLayerError> {
        latest_lifetimes(&self.db).await
    }

    async fn get_certificate_list(
        &self,
        csr_id: &CsrId,
    ) -> Result<Vec<Certificate>, DataLayerError> {
        let models = certificate::Entity::find()
            .filter(certificate::Column::CsrId.eq(csr_id))
            .order_by_desc(certificate::Column::NotAfter)
            .order_by_desc(certificate::Column::CreatedDate)
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(models.into_iter().map(Certificate::from).collect())
    }

    async fn delete_superseded_certificates(&self, csr_id: &CsrId) -> Result<u64, DataLayerError> {
        delete_superseded(&self.db, csr_id).await
    }

    async fn delete_all_superseded_certificates(&self) -> Result<u64, DataLayerError> {
        let csr_ids: Vec<CsrId> = certificate::Entity::find()
            .select_only()
            .column(certificate::Column::CsrId)
            .group_by(certificate::Column::CsrId)
            .having(Expr::expr(Func::count(Expr::col(certificate::Column::Id))).gt(1))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        let tx = self.db.begin().await.map_err(to_data_layer_error)?;
        let mut deleted = 0;
        for csr_id in &csr_ids {
            deleted += delete_superseded(&tx, csr_id).await?;
        }
        tx.commit().await.map_err(to_data_layer_error)?;

        Ok(deleted)
    }

    async fn delete_all_certificates(&self, csr_id: &CsrId) -> Result<u64, DataLayerError> {
        let result = certificate::Entity::delete_many()
            .filter(certificate::Column::CsrId.eq(csr_id))
            .exec(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(result.rows_affected)
    }
}

async fn delete_superseded(
    db: &impl ConnectionTrait,
    csr_id: &CsrId,
) -> Result<u64, DataLayerError> {
    let current: Option<CertificateId> = certificate::Entity::find()
        .select_only()
        .column(certificate::Column::Id)
        .filter(certificate::Column::CsrId.eq(csr_id))
        .order_by_desc(certificate::Column::NotAfter)
        .order_by_desc(certificate::Column::CreatedDate)
        .into_tuple()
        .one(db)
        .await
        .map_err(to_data_layer_error)?;

    let Some(current) = current else {
        return Ok(0);
    };

    let result = certificate::Entity::delete_many()
        .filter(certificate::Column::CsrId.eq(csr_id))
        .filter(certificate::Column::Id.ne(current))
        .exec(db)
        .await
        .map_err(to_data_layer_error)?;

    Ok(result.rows_affected)
}
