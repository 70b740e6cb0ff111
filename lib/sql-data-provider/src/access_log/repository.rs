use async_trait::async_trait;
use autometrics::autometrics;
use ca_core::model::access_log::AccessLog;
use ca_core::repository::access_log_repository::AccessLogRepository;
use ca_core::repository::error::DataLayerError;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use shared_types::{AccessLogId, CsrId};

use super::AccessLogProvider;
use crate::entity::access_log;
use crate::mapper::to_data_layer_error;

#[autometrics]
#[async_trait]
impl AccessLogRepository for AccessLogProvider {
    async fn create_access_log(&self, request: AccessLog) -> Result<AccessLogId, DataLayerError> {
        let model = access_log::ActiveModel::from(request)
            .insert(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(model.id)
    }

    async fn get_access_log_list(&self, csr_id: &CsrId) -> Result<Vec<AccessLog>, DataLayerError> {
        let models = access_log::Entity::find()
            .filter(access_log::Column::CsrId.eq(csr_id))
            .order_by_desc(access_log::Column::When)
            .all(&self.db)
            .await
            .map_err(to_data_layer_error)?;

        Ok(models.into_iter().map(AccessLog::from).collect())
    }
}
