use std::collections::HashMap;

use ca_core::model::certificate::CertificateLifetime;
use ca_core::model::csr::CsrListItem;
use shared_types::CsrId;

use crate::entity::csr;

pub(super) fn csr_list_from_models(
    models: Vec<csr::Model>,
    lifetimes: &HashMap<CsrId, CertificateLifetime>,
) -> Vec<CsrListItem> {
    models
        .into_iter()
        .map(|model| CsrListItem {
            latest_not_after: lifetimes.get(&model.id).map(|lifetime| lifetime.not_after),
            id: model.id,
            sha256sum: model.sha256sum,
            commonname: model.commonname,
        })
        .collect()
}
