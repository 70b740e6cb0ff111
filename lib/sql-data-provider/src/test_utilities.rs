use ca_core::model::certificate::Certificate;
use ca_core::model::csr::Csr;
use ca_core::model::subject_alt_name::{SubjectAltName, SubjectAltNameKind};
use sea_orm::{ActiveModelTrait, DatabaseConnection};
use shared_types::{CertificateId, CsrId};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::entity::{certificate, csr};
use crate::{DataLayer, db_conn};

pub fn get_dummy_date() -> OffsetDateTime {
    datetime!(2025-03-01 12:00 UTC)
}

pub async fn setup_test_data_layer_and_connection_with_custom_url(database_url: &str) -> DataLayer {
    let db = db_conn(database_url).await.unwrap();
    DataLayer::build(db)
}

pub async fn setup_test_data_layer_and_connection() -> DataLayer {
    setup_test_data_layer_and_connection_with_custom_url("sqlite::memory:").await
}

pub fn dummy_csr(commonname: &str) -> Csr {
    let id = CsrId::from(Uuid::new_v4());
    Csr {
        id,
        created_date: get_dummy_date(),
        sha256sum: format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()),
        pem: commonname.as_bytes().to_vec(),
        orgunit: "Devices".to_owned(),
        commonname: commonname.to_owned(),
        rejected: false,
        subject_alt_names: Some(vec![
            SubjectAltName::new(id, SubjectAltNameKind::Dns, commonname).unwrap(),
        ]),
        certificates: None,
    }
}

pub fn dummy_certificate(csr_id: CsrId, not_before: OffsetDateTime, lifetime: Duration) -> Certificate {
    Certificate {
        id: CertificateId::from(Uuid::new_v4()),
        csr_id,
        created_date: not_before,
        pem: "-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----\n".to_owned(),
        not_before,
        not_after: not_before + lifetime,
    }
}

/// Inserts the CSR row only, relations are ignored
pub async fn insert_csr(db: &DatabaseConnection, csr: &Csr) -> CsrId {
    csr::ActiveModel::from(csr).insert(db).await.unwrap().id
}

pub async fn insert_certificate(db: &DatabaseConnection, certificate: Certificate) -> CertificateId {
    certificate::ActiveModel::from(certificate)
        .insert(db)
        .await
        .unwrap()
        .id
}
