use shared_types::{CertificateId, CsrId};
use time::{Duration, OffsetDateTime};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Certificate {
    pub id: CertificateId,
    pub csr_id: CsrId,
    pub created_date: OffsetDateTime,
    pub pem: String,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Certificate {
    pub fn lifetime(&self) -> CertificateLifetime {
        CertificateLifetime {
            not_before: self.not_before,
            not_after: self.not_after,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct CertificateRelations {}

/// Validity window of the most recent certificate of a CSR
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CertificateLifetime {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl CertificateLifetime {
    pub fn duration(&self) -> Duration {
        self.not_after - self.not_before
    }

    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        self.not_after > now
    }
}
