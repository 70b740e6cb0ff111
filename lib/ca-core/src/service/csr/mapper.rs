use one_dto_mapper::convert_inner;

use super::dto::CsrDetailResponseDTO;
use crate::model::access_log::AccessLog;
use crate::model::csr::Csr;
use crate::service::error::ServiceError;

pub(super) fn csr_detail_from_model(
    csr: Csr,
    access_log: Vec<AccessLog>,
) -> Result<CsrDetailResponseDTO, ServiceError> {
    let subject_alt_names = csr
        .subject_alt_names
        .ok_or_else(|| ServiceError::MappingError("subject_alt_names is None".to_string()))?
        .iter()
        .map(ToString::to_string)
        .collect();
    let certificates = csr
        .certificates
        .ok_or_else(|| ServiceError::MappingError("certificates is None".to_string()))?;

    Ok(CsrDetailResponseDTO {
        id: csr.id,
        created_date: csr.created_date,
        sha256sum: csr.sha256sum,
        orgunit: csr.orgunit,
        commonname: csr.commonname,
        rejected: csr.rejected,
        subject_alt_names,
        certificates: convert_inner(certificates),
        access_log: convert_inner(access_log),
    })
}
