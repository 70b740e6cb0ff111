//! Relational storage of CSRs, their subject alternative names, issued certificates and
//! fetch attempts, on top of sea-orm.

use std::sync::Arc;

use access_log::AccessLogProvider;
use ca_core::repository::DataRepository;
use ca_core::repository::access_log_repository::AccessLogRepository;
use ca_core::repository::certificate_repository::CertificateRepository;
use ca_core::repository::csr_repository::CsrRepository;
use certificate::CertificateProvider;
use csr::CsrProvider;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection, DbErr};

mod entity;
mod mapper;

pub mod access_log;
pub mod certificate;
pub mod csr;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utilities;

#[derive(Clone)]
pub struct DataLayer {
    // Used for tests for now
    #[allow(unused)]
    pub(crate) db: DatabaseConnection,
    csr_repository: Arc<dyn CsrRepository>,
    certificate_repository: Arc<dyn CertificateRepository>,
    access_log_repository: Arc<dyn AccessLogRepository>,
}

impl DataLayer {
    pub fn build(db: DatabaseConnection) -> Self {
        let csr_repository = Arc::new(CsrProvider { db: db.clone() });
        let certificate_repository = Arc::new(CertificateProvider { db: db.clone() });
        let access_log_repository = Arc::new(AccessLogProvider { db: db.clone() });

        Self {
            db,
            csr_repository,
            certificate_repository,
            access_log_repository,
        }
    }
}

/// Connects and brings the schema up to date
pub async fn db_conn(database_url: impl Into<String>) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);

    let db = sea_orm::Database::connect(options).await?;
    Migrator::up(&db, None).await?;

    tracing::debug!("Database schema is up to date");
    Ok(db)
}

impl DataRepository for DataLayer {
    fn get_csr_repository(&self) -> Arc<dyn CsrRepository> {
        self.csr_repository.clone()
    }

    fn get_certificate_repository(&self) -> Arc<dyn CertificateRepository> {
        self.certificate_repository.clone()
    }

    fn get_access_log_repository(&self) -> Arc<dyn AccessLogRepository> {
        self.access_log_repository.clone()
    }
}
