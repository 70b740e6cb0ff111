use one_dto_mapper::From;
use shared_types::{AccessLogId, CertificateId, CsrId};
use time::OffsetDateTime;

use crate::model::access_log::AccessLog;
use crate::model::certificate::Certificate;
use crate::model::csr::CsrListItem;

#[derive(Clone, Debug)]
pub struct SubmitCsrRequestDTO {
    pub pem: Vec<u8>,
    /// Fingerprint announced by the client, must match the PEM
    pub sha256sum: String,
}

#[derive(Clone, Debug)]
pub struct SubmitCsrResponseDTO {
    pub id: CsrId,
    pub sha256sum: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FetchCertificateResponseDTO {
    /// PEM of the current certificate
    Certificate(String),
    /// Not signed yet, or the current certificate expired
    Pending,
}

#[derive(Clone, Debug, Eq, PartialEq, From)]
#[from(CsrListItem)]
pub struct CsrListItemResponseDTO {
    pub id: CsrId,
    pub sha256sum: String,
    pub commonname: String,
    pub latest_not_after: Option<OffsetDateTime>,
}

#[derive(Clone, Debug)]
pub struct CsrDetailResponseDTO {
    pub id: CsrId,
    pub created_date: OffsetDateTime,
    pub sha256sum: String,
    pub orgunit: String,
    pub commonname: String,
    pub rejected: bool,
    pub subject_alt_names: Vec<String>,
    pub certificates: Vec<CertificateListItemResponseDTO>,
    pub access_log: Vec<AccessLogResponseDTO>,
}

#[derive(Clone, Debug, From)]
#[from(Certificate)]
pub struct CertificateListItemResponseDTO {
    pub id: CertificateId,
    pub created_date: OffsetDateTime,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

#[derive(Clone, Debug, From)]
#[from(AccessLog)]
pub struct AccessLogResponseDTO {
    pub id: AccessLogId,
    pub when: OffsetDateTime,
    pub addr: String,
}
