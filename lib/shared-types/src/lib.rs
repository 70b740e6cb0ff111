//! Identifier newtypes shared between the core and the data layer.

mod macros;

mod access_log_id;
mod certificate_id;
mod csr_id;
mod subject_alt_name_id;

pub use access_log_id::AccessLogId;
pub use certificate_id::CertificateId;
pub use csr_id::CsrId;
pub use subject_alt_name_id::SubjectAltNameId;
