use std::sync::Arc;

use access_log_repository::AccessLogRepository;
use certificate_repository::CertificateRepository;
use csr_repository::CsrRepository;

pub mod access_log_repository;
pub mod certificate_repository;
pub mod csr_repository;
pub mod error;

pub trait DataRepository: Send + Sync {
    fn get_csr_repository(&self) -> Arc<dyn CsrRepository>;
    fn get_certificate_repository(&self) -> Arc<dyn CertificateRepository>;
    fn get_access_log_repository(&self) -> Arc<dyn AccessLogRepository>;
}
