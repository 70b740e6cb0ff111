use async_trait::async_trait;
use shared_types::{AccessLogId, CsrId};

use crate::model::access_log::AccessLog;
use crate::repository::error::DataLayerError;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait AccessLogRepository: Send + Sync {
    async fn create_access_log(&self, request: AccessLog) -> Result<AccessLogId, DataLayerError>;

    async fn get_access_log_list(&self, csr_id: &CsrId) -> Result<Vec<AccessLog>, DataLayerError>;
}
