use shared_types::{CertificateId, CsrId};
use time::OffsetDateTime;

use crate::model::certificate::Certificate;

#[derive(Clone, Debug)]
pub struct SignedCertificateResponseDTO {
    pub id: CertificateId,
    pub csr_id: CsrId,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub pem: String,
}

impl From<Certificate> for SignedCertificateResponseDTO {
    fn from(value: Certificate) -> Self {
        Self {
            id: value.id,
            csr_id: value.csr_id,
            not_before: value.not_before,
            not_after: value.not_after,
            pem: value.pem,
        }
    }
}
