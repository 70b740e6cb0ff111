use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use self::autosign::Autosign;
use self::refresh_certificates::RefreshCertificates;
use crate::service::certificate::CertificateService;
use crate::service::error::ServiceError;

pub mod autosign;
pub mod provider;
pub mod refresh_certificates;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait Task: Send + Sync {
    async fn run(&self) -> Result<Value, ServiceError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumString, EnumIter)]
pub enum TaskType {
    #[strum(serialize = "REFRESH")]
    Refresh,
    #[strum(serialize = "AUTOSIGN")]
    Autosign,
}

pub(crate) fn tasks(certificate_service: CertificateService) -> HashMap<String, Arc<dyn Task>> {
    TaskType::iter()
        .map(|r#type| {
            let task = match r#type {
                TaskType::Refresh => {
                    Arc::new(RefreshCertificates::new(certificate_service.clone())) as _
                }
                TaskType::Autosign => Arc::new(Autosign::new(certificate_service.clone())) as _,
            };
            (r#type.to_string(), task)
        })
        .collect()
}
