use shared_types::CsrId;
use time::OffsetDateTime;

use super::certificate::{Certificate, CertificateRelations};
use super::subject_alt_name::{SubjectAltName, SubjectAltNameRelations};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Csr {
    pub id: CsrId,
    pub created_date: OffsetDateTime,
    /// Lowercase hex SHA-256 of the submitted PEM bytes
    pub sha256sum: String,
    pub pem: Vec<u8>,
    pub orgunit: String,
    pub commonname: String,
    pub rejected: bool,

    // Relations:
    pub subject_alt_names: Option<Vec<SubjectAltName>>,
    /// Newest `not_after` first
    pub certificates: Option<Vec<Certificate>>,
}

impl Csr {
    /// The certificate with the latest expiry, `None` when unsigned or not loaded.
    pub fn current_certificate(&self) -> Option<&Certificate> {
        self.certificates.as_ref().and_then(|certificates| certificates.first())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct CsrRelations {
    pub subject_alt_names: Option<SubjectAltNameRelations>,
    pub certificates: Option<CertificateRelations>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CsrListItem {
    pub id: CsrId,
    pub sha256sum: String,
    pub commonname: String,
    pub latest_not_after: Option<OffsetDateTime>,
}
