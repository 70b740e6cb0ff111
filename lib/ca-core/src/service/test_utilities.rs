use shared_types::CertificateId;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::config::core_config::{AppConfig, CoreConfig, InputFormat, NoCustomConfig};
use crate::model::certificate::Certificate;
use crate::model::csr::Csr;
use crate::proto::certificate_request::CertificateRequest;
use crate::test_data::sha256_hex;

pub const NOW: OffsetDateTime = datetime!(2025-03-01 12:00:00 UTC);

pub fn core_config() -> CoreConfig {
    let config = indoc::indoc! {"
        ca:
            certificate: 'ca.crt'
            key: 'ca.key'
        lifetime:
            short: 172800
            long: 604800
            backdate: true
    "};

    AppConfig::<NoCustomConfig>::parse(vec![InputFormat::yaml_str(config)])
        .unwrap()
        .core
}

/// Stored form of a fixture CSR, without certificates
pub fn dummy_csr(pem: &str) -> Csr {
    CertificateRequest::parse(pem.as_bytes())
        .unwrap()
        .to_csr(sha256_hex(pem), NOW - Duration::days(30))
        .unwrap()
}

pub fn dummy_certificate(csr: &Csr, not_before: OffsetDateTime, lifetime: Duration) -> Certificate {
    Certificate {
        id: CertificateId::new_random(),
        csr_id: csr.id,
        created_date: not_before,
        pem: "-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----\n".to_owned(),
        not_before,
        not_after: not_before + lifetime,
    }
}
