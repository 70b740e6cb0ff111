use async_trait::async_trait;
use autometrics::autometrics;
use ca_core::model::certificate::Certificate;
use ca_core::model::csr::{Csr, CsrListItem, CsrRelations};
use ca_core::model::subject_alt_name::SubjectAltName;
use ca_core::repository::csr_repository::CsrRepository;
use ca_core::repository::error::DataLayerError;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, TransactionTrait,
};
use shared_types::CsrId;

use super::CsrProvider;
use super::mapper::csr_list_from_models;
use crate::certificate::latest_lifetimes;
use crate::entity::{certificate, csr, subject_alt_name};
use crate::mapper::to_data_layer_error;

#[autometrics]
#[async_trait]
impl CsrRepository for CsrProvider {
    async fn create_csr(&self, request: Csr) -> Result<CsrId, DataLayerError> {
        let tx = self.db.begin().await.map_err(to_data_layer_error)?;

        let id = csr::ActiveModel::from(&request)
            .insert(&tx)
            .await
            .map_err(to_data_layer_error)?
            .id;

        let subject_alt_names = request.subject_alt_names.unwrap_or_default();
        if !subject_alt_names.is_empty() {
            subject_alt_name::Entity::insert_many(
                subject_alt_names
                    .into_iter()
                    .map(subject_alt_name::ActiveModel::from),
            )
            .exec(&tx)
            .await
            .map_err(to_data_layer_error)?;
        }

        tx.commit().await.map_err(to_data_layer_error)?;

        Ok(id)
    }

    async fn get_csr(
        &self,
        id: &CsrId,
        relations: &CsrRelations,
    ) -> Result<Option<Csr>, DataLayerError> {
        let model = csr::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        match model {
            None => Ok(None),
            Some(model) => load_relations(&self.db, model, relations).await.map(Some),
        }
    }

    async fn get_csr_by_sha256sum(
        &self,
        sha256sum: &str,
        relations: &CsrRelations,
    ) -> Result<Option<Csr>, DataLayerError> {
        let model = csr::Entity::find()
            .filter(csr::Column::Sha256sum.eq(sha256sum))
            .one(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        match model {
            None => Ok(None),
            Some(model) => load_relations(&self.db, model, relations).await.map(Some),
        }
    }

    async fn get_refreshable_csrs(&self) -> Result<Vec<Csr>, DataLayerError> {
        let signed = Query::select()
            .distinct()
            .column(certificate::Column::CsrId)
            .from(certificate::Entity)
            .to_owned();

        let models = csr::Entity::find()
            .filter(csr::Column::Rejected.eq(false))
            .filter(csr::Column::Id.in_subquery(signed))
            .order_by_asc(csr::Column::CreatedDate)
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(models.into_iter().map(Csr::from).collect())
    }

    async fn get_unsigned_csrs(&self) -> Result<Vec<Csr>, DataLayerError> {
        let models = unsigned_csrs()
            .order_by_asc(csr::Column::CreatedDate)
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(models.into_iter().map(Csr::from).collect())
    }

    async fn count_unsigned_csrs(&self) -> Result<u64, DataLayerError> {
        unsigned_csrs()
            .count(&self.db)
            .await
            .map_err(to_data_layer_error)
    }

    async fn get_csr_list(&self) -> Result<Vec<CsrListItem>, DataLayerError> {
        let models = csr::Entity::find()
            .filter(csr::Column::Rejected.eq(false))
            .order_by_asc(csr::Column::CreatedDate)
            .order_by_asc(csr::Column::Commonname)
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        let lifetimes = latest_lifetimes(&self.db).await?;

        Ok(csr_list_from_models(models, &lifetimes))
    }

    async fn reject_csr(&self, id: &CsrId) -> Result<(), DataLayerError> {
        csr::Entity::update_many()
            .col_expr(csr::Column::Rejected, Expr::value(true))
            .filter(csr::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(())
    }
}

/// Non-rejected CSRs without any certificate
fn unsigned_csrs() -> Select<csr::Entity> {
    let signed = Query::select()
        .distinct()
        .column(certificate::Column::CsrId)
        .from(certificate::Entity)
        .to_owned();

    csr::Entity::find()
        .filter(csr::Column::Rejected.eq(false))
        .filter(csr::Column::Id.not_in_subquery(signed))
}

pub(crate) async fn load_relations(
    db: &impl ConnectionTrait,
    model: csr::Model,
    relations: &CsrRelations,
) -> Result<Csr, DataLayerError> {
    let id = model.id;
    let mut csr = Csr::from(model);

    if relations.subject_alt_names.is_some() {
        let subject_alt_names = subject_alt_name::Entity::find()
            .filter(subject_alt_name::Column::CsrId.eq(id))
            .order_by_asc(subject_alt_name::Column::Kind)
            .order_by_asc(subject_alt_name::Column::Value)
            .all(db)
            .await
            .map_err(to_data_layer_error)?;

        csr.subject_alt_names = Some(
            subject_alt_names
                .into_iter()
                .map(SubjectAltName::try_from)
                .collect::<Result<_, _>>()?,
        );
    }

    if relations.certificates.is_some() {
        let certificates = certificate::Entity::find()
            .filter(certificate::Column::CsrId.eq(id))
            .order_by_desc(certificate::Column::NotAfter)
            .order_by_desc(certificate::Column::CreatedDate)
            .all(db)
            .await
            .map_err(to_data_layer_error)?;

        csr.certificates = Some(certificates.into_iter().map(Certificate::from).collect());
    }

    Ok(csr)
}
