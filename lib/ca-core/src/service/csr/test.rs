use std::sync::Arc;

use mockall::predicate::eq;
use shared_types::{AccessLogId, CsrId};
use time::Duration;

use super::CsrService;
use super::dto::{FetchCertificateResponseDTO, SubmitCsrRequestDTO};
use crate::model::access_log::AccessLog;
use crate::model::csr::{Csr, CsrListItem};
use crate::proto::clock::MockClock;
use crate::repository::access_log_repository::MockAccessLogRepository;
use crate::repository::csr_repository::MockCsrRepository;
use crate::repository::error::DataLayerError;
use crate::service::error::{
    BusinessLogicError, EntityAlreadyExistsError, EntityNotFoundError, ServiceError,
    ValidationError,
};
use crate::service::test_utilities::{NOW, core_config, dummy_certificate, dummy_csr};
use crate::test_data::{
    BAD_SIGNATURE_CSR, FOREIGN_CSR, GOOD_CSR, NO_COMMON_NAME_CSR, sha256_hex, signing_cert,
};

#[derive(Default)]
struct Mocks {
    csr_repository: MockCsrRepository,
    access_log_repository: MockAccessLogRepository,
}

fn setup_service(mocks: Mocks) -> CsrService {
    let mut clock = MockClock::new();
    clock.expect_now_utc().return_const(NOW);

    CsrService::new(
        Arc::new(mocks.csr_repository),
        Arc::new(mocks.access_log_repository),
        Arc::new(signing_cert()),
        Arc::new(clock),
        Arc::new(core_config()),
    )
}

fn submit_request(pem: &str) -> SubmitCsrRequestDTO {
    SubmitCsrRequestDTO {
        pem: pem.as_bytes().to_vec(),
        sha256sum: sha256_hex(pem),
    }
}

#[tokio::test]
async fn test_submit_csr_success() {
    let mut csr_repository = MockCsrRepository::new();
    csr_repository
        .expect_get_csr_by_sha256sum()
        .once()
        .returning(|_, _| Ok(None));
    csr_repository
        .expect_create_csr()
        .once()
        .withf(|csr| {
            csr.sha256sum == sha256_hex(GOOD_CSR)
                && csr.pem == GOOD_CSR.as_bytes()
                && csr.orgunit == "Devices"
                && csr.commonname == "device.example.com"
                && !csr.rejected
                && csr.created_date == NOW
                && csr.subject_alt_names.as_ref().is_some_and(|names| names.len() == 1)
        })
        .returning(|csr| Ok(csr.id));

    let service = setup_service(Mocks {
        csr_repository,
        ..Default::default()
    });

    let response = service.submit_csr(submit_request(GOOD_CSR)).await.unwrap();
    assert_eq!(response.sha256sum, sha256_hex(GOOD_CSR));
}

#[tokio::test]
async fn test_submit_csr_fingerprint_mismatch() {
    let service = setup_service(Mocks::default());

    let mut request = submit_request(GOOD_CSR);
    request.sha256sum = sha256_hex(FOREIGN_CSR);

    assert!(matches!(
        service.submit_csr(request).await,
        Err(ServiceError::Validation(
            ValidationError::FingerprintMismatch { .. }
        ))
    ));
}

#[tokio::test]
async fn test_submit_csr_trailing_garbage() {
    let service = setup_service(Mocks::default());

    let pem = format!("{GOOD_CSR}garbage\n");
    assert!(matches!(
        service.submit_csr(submit_request(&pem)).await,
        Err(ServiceError::Validation(ValidationError::InvalidCsr(_)))
    ));
}

#[tokio::test]
async fn test_submit_csr_bad_signature() {
    let service = setup_service(Mocks::default());

    assert!(matches!(
        service.submit_csr(submit_request(BAD_SIGNATURE_CSR)).await,
        Err(ServiceError::Validation(ValidationError::InvalidCsr(_)))
    ));
}

#[tokio::test]
async fn test_submit_csr_foreign_subject() {
    let service = setup_service(Mocks::default());

    let result = service.submit_csr(submit_request(FOREIGN_CSR)).await;
    assert!(matches!(
        result,
        Err(ServiceError::Validation(ValidationError::SubjectPrefixMismatch { prefix, .. }))
            if prefix == "C=SE, ST=Ostergotland, L=Linkoping, O=Example AB"
    ));
}

#[tokio::test]
async fn test_submit_csr_without_common_name() {
    let service = setup_service(Mocks::default());

    assert!(matches!(
        service.submit_csr(submit_request(NO_COMMON_NAME_CSR)).await,
        Err(ServiceError::Validation(ValidationError::InvalidCsr(_)))
    ));
}

#[tokio::test]
async fn test_submit_csr_too_large() {
    let service = setup_service(Mocks::default());

    let pem = "A".repeat(2049);
    assert!(matches!(
        service.submit_csr(submit_request(&pem)).await,
        Err(ServiceError::Validation(ValidationError::CsrTooLarge {
            size: 2049,
            max: 2048
        }))
    ));
}

#[tokio::test]
async fn test_submit_csr_duplicate() {
    let mut csr_repository = MockCsrRepository::new();
    csr_repository
        .expect_get_csr_by_sha256sum()
        .once()
        .returning(|_, _| Ok(Some(dummy_csr(GOOD_CSR))));

    let service = setup_service(Mocks {
        csr_repository,
        ..Default::default()
    });

    assert!(matches!(
        service.submit_csr(submit_request(GOOD_CSR)).await,
        Err(ServiceError::EntityAlreadyExists(
            EntityAlreadyExistsError::Csr(_)
        ))
    ));
}

#[tokio::test]
async fn test_submit_csr_concurrent_duplicate() {
    let mut csr_repository = MockCsrRepository::new();
    csr_repository
        .expect_get_csr_by_sha256sum()
        .returning(|_, _| Ok(None));
    csr_repository
        .expect_create_csr()
        .returning(|_| Err(DataLayerError::AlreadyExists));

    let service = setup_service(Mocks {
        csr_repository,
        ..Default::default()
    });

    assert!(matches!(
        service.submit_csr(submit_request(GOOD_CSR)).await,
        Err(ServiceError::EntityAlreadyExists(_))
    ));
}

fn fetch_mocks(csr: Csr) -> Mocks {
    let csr_id = csr.id;
    let sha256sum = csr.sha256sum.clone();

    let mut csr_repository = MockCsrRepository::new();
    csr_repository
        .expect_get_csr_by_sha256sum()
        .with(eq(sha256sum), mockall::predicate::always())
        .once()
        .returning(move |_, _| Ok(Some(csr.clone())));

    let mut access_log_repository = MockAccessLogRepository::new();
    access_log_repository
        .expect_create_access_log()
        .once()
        .withf(move |entry| entry.csr_id == csr_id && entry.addr == "192.0.2.1" && entry.when == NOW)
        .returning(|entry| Ok(entry.id));

    Mocks {
        csr_repository,
        access_log_repository,
    }
}

#[tokio::test]
async fn test_fetch_certificate_current() {
    let mut csr = dummy_csr(GOOD_CSR);
    let current = dummy_certificate(&csr, NOW - Duration::hours(1), Duration::hours(48));
    let expired = dummy_certificate(&csr, NOW - Duration::days(3), Duration::hours(48));
    csr.certificates = Some(vec![current.clone(), expired]);
    let sha256sum = csr.sha256sum.clone();

    let service = setup_service(fetch_mocks(csr));

    let result = service
        .fetch_certificate(&sha256sum, "192.0.2.1".to_owned())
        .await
        .unwrap();
    assert_eq!(result, FetchCertificateResponseDTO::Certificate(current.pem));
}

#[tokio::test]
async fn test_fetch_certificate_pending() {
    let csr = dummy_csr(GOOD_CSR);
    let sha256sum = csr.sha256sum.clone();

    let service = setup_service(fetch_mocks(csr));

    let result = service
        .fetch_certificate(&sha256sum, "192.0.2.1".to_owned())
        .await
        .unwrap();
    assert_eq!(result, FetchCertificateResponseDTO::Pending);
}

#[tokio::test]
async fn test_fetch_certificate_expired_is_pending() {
    let mut csr = dummy_csr(GOOD_CSR);
    csr.certificates = Some(vec![dummy_certificate(
        &csr,
        NOW - Duration::days(3),
        Duration::hours(48),
    )]);
    let sha256sum = csr.sha256sum.clone();

    let service = setup_service(fetch_mocks(csr));

    let result = service
        .fetch_certificate(&sha256sum, "192.0.2.1".to_owned())
        .await
        .unwrap();
    assert_eq!(result, FetchCertificateResponseDTO::Pending);
}

#[tokio::test]
async fn test_fetch_certificate_rejected() {
    let mut csr = dummy_csr(GOOD_CSR);
    csr.rejected = true;
    csr.certificates = Some(vec![dummy_certificate(
        &csr,
        NOW - Duration::hours(1),
        Duration::hours(48),
    )]);
    let sha256sum = csr.sha256sum.clone();

    let service = setup_service(fetch_mocks(csr));

    assert!(matches!(
        service
            .fetch_certificate(&sha256sum, "192.0.2.1".to_owned())
            .await,
        Err(ServiceError::BusinessLogic(BusinessLogicError::CsrRejected(_)))
    ));
}

#[tokio::test]
async fn test_fetch_certificate_unknown() {
    let mut csr_repository = MockCsrRepository::new();
    csr_repository
        .expect_get_csr_by_sha256sum()
        .returning(|_, _| Ok(None));
    let mut access_log_repository = MockAccessLogRepository::new();
    access_log_repository.expect_create_access_log().never();

    let service = setup_service(Mocks {
        csr_repository,
        access_log_repository,
    });

    assert!(matches!(
        service.fetch_certificate("00", "192.0.2.1".to_owned()).await,
        Err(ServiceError::EntityNotFound(
            EntityNotFoundError::CsrFingerprint(_)
        ))
    ));
}

#[tokio::test]
async fn test_get_csr_list() {
    let csr = dummy_csr(GOOD_CSR);
    let item = CsrListItem {
        id: csr.id,
        sha256sum: csr.sha256sum.clone(),
        commonname: csr.commonname.clone(),
        latest_not_after: Some(NOW),
    };

    let mut csr_repository = MockCsrRepository::new();
    csr_repository.expect_get_csr_list().once().returning({
        let item = item.clone();
        move || Ok(vec![item.clone()])
    });

    let service = setup_service(Mocks {
        csr_repository,
        ..Default::default()
    });

    let list = service.get_csr_list().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, item.id);
    assert_eq!(list[0].commonname, "device.example.com");
    assert_eq!(list[0].latest_not_after, Some(NOW));
}

#[tokio::test]
async fn test_get_csr_detail() {
    let mut csr = dummy_csr(GOOD_CSR);
    csr.certificates = Some(vec![dummy_certificate(&csr, NOW, Duration::hours(48))]);
    let csr_id = csr.id;

    let mut csr_repository = MockCsrRepository::new();
    csr_repository
        .expect_get_csr()
        .once()
        .returning(move |_, _| Ok(Some(csr.clone())));

    let mut access_log_repository = MockAccessLogRepository::new();
    access_log_repository
        .expect_get_access_log_list()
        .with(eq(csr_id))
        .once()
        .returning(move |csr_id| {
            Ok(vec![AccessLog {
                id: AccessLogId::new_random(),
                csr_id: *csr_id,
                when: NOW,
                addr: "192.0.2.1".to_owned(),
            }])
        });

    let service = setup_service(Mocks {
        csr_repository,
        access_log_repository,
    });

    let detail = service.get_csr(&csr_id).await.unwrap();
    assert_eq!(detail.subject_alt_names, vec!["DNS:device.example.com"]);
    assert_eq!(detail.certificates.len(), 1);
    assert_eq!(detail.access_log[0].addr, "192.0.2.1");
}

#[tokio::test]
async fn test_reject_csr() {
    let csr = dummy_csr(GOOD_CSR);
    let csr_id = csr.id;

    let mut csr_repository = MockCsrRepository::new();
    csr_repository
        .expect_get_csr()
        .once()
        .returning(move |_, _| Ok(Some(csr.clone())));
    csr_repository
        .expect_reject_csr()
        .with(eq(csr_id))
        .once()
        .returning(|_| Ok(()));

    let service = setup_service(Mocks {
        csr_repository,
        ..Default::default()
    });

    service.reject_csr(&csr_id).await.unwrap();
}

#[tokio::test]
async fn test_reject_unknown_csr() {
    let mut csr_repository = MockCsrRepository::new();
    csr_repository.expect_get_csr().returning(|_, _| Ok(None));
    csr_repository.expect_reject_csr().never();

    let service = setup_service(Mocks {
        csr_repository,
        ..Default::default()
    });

    let id = CsrId::new_random();
    assert!(matches!(
        service.reject_csr(&id).await,
        Err(ServiceError::EntityNotFound(EntityNotFoundError::Csr(missing))) if missing == id
    ));
}
