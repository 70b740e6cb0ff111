use ca_core::model::certificate::CertificateRelations;
use ca_core::model::csr::CsrRelations;
use ca_core::model::subject_alt_name::{SubjectAltNameKind, SubjectAltNameRelations};
use ca_core::repository::csr_repository::CsrRepository;
use ca_core::repository::error::DataLayerError;
use sea_orm::{DatabaseConnection, EntityTrait};
use similar_asserts::assert_eq;
use time::Duration;

use super::CsrProvider;
use crate::entity;
use crate::test_utilities::{
    dummy_certificate, dummy_csr, get_dummy_date, insert_certificate, insert_csr,
    setup_test_data_layer_and_connection,
};

struct TestSetup {
    pub db: DatabaseConnection,
    pub provider: CsrProvider,
}

async fn setup() -> TestSetup {
    let data_layer = setup_test_data_layer_and_connection().await;
    let db = data_layer.db;

    TestSetup {
        db: db.clone(),
        provider: CsrProvider { db },
    }
}

fn all_relations() -> CsrRelations {
    CsrRelations {
        subject_alt_names: Some(SubjectAltNameRelations::default()),
        certificates: Some(CertificateRelations::default()),
    }
}

#[tokio::test]
async fn test_create_csr_stores_subject_alt_names() {
    // given
    let setup = setup().await;
    let csr = dummy_csr("device.example.com");

    // when
    let id = setup.provider.create_csr(csr.clone()).await.unwrap();

    // then
    assert_eq!(id, csr.id);
    let subject_alt_names = entity::subject_alt_name::Entity::find()
        .all(&setup.db)
        .await
        .unwrap();
    assert_eq!(subject_alt_names.len(), 1);
    assert_eq!(subject_alt_names[0].csr_id, csr.id);
    assert_eq!(subject_alt_names[0].value, "device.example.com");
}

#[tokio::test]
async fn test_create_csr_duplicate_fingerprint() {
    // given
    let setup = setup().await;
    let csr = dummy_csr("device.example.com");
    setup.provider.create_csr(csr.clone()).await.unwrap();

    let mut duplicate = dummy_csr("other.example.com");
    duplicate.sha256sum = csr.sha256sum.clone();

    // when
    let result = setup.provider.create_csr(duplicate).await;

    // then
    assert!(matches!(result, Err(DataLayerError::AlreadyExists)));
    assert_eq!(
        entity::csr::Entity::find().all(&setup.db).await.unwrap().len(),
        1
    );
    assert_eq!(
        entity::subject_alt_name::Entity::find()
            .all(&setup.db)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_get_csr_with_relations() {
    // given
    let setup = setup().await;
    let csr = dummy_csr("device.example.com");
    setup.provider.create_csr(csr.clone()).await.unwrap();

    let older = dummy_certificate(csr.id, get_dummy_date(), Duration::days(2));
    let newer = dummy_certificate(
        csr.id,
        get_dummy_date() + Duration::days(1),
        Duration::days(2),
    );
    insert_certificate(&setup.db, older.clone()).await;
    insert_certificate(&setup.db, newer.clone()).await;

    // when
    let result = setup
        .provider
        .get_csr(&csr.id, &all_relations())
        .await
        .unwrap()
        .unwrap();

    // then
    assert_eq!(result.sha256sum, csr.sha256sum);
    assert_eq!(result.pem, csr.pem);
    assert_eq!(result.subject_alt_names, csr.subject_alt_names);
    assert_eq!(result.certificates, Some(vec![newer.clone(), older]));
    assert_eq!(result.current_certificate(), Some(&newer));
}

#[tokio::test]
async fn test_get_csr_without_relations() {
    // given
    let setup = setup().await;
    let csr = dummy_csr("device.example.com");
    setup.provider.create_csr(csr.clone()).await.unwrap();

    // when
    let result = setup
        .provider
        .get_csr(&csr.id, &CsrRelations::default())
        .await
        .unwrap()
        .unwrap();

    // then
    assert_eq!(result.subject_alt_names, None);
    assert_eq!(result.certificates, None);
}

#[tokio::test]
async fn test_get_csr_missing() {
    let setup = setup().await;

    let result = setup
        .provider
        .get_csr(&uuid::Uuid::new_v4().into(), &all_relations())
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_get_csr_by_sha256sum() {
    // given
    let setup = setup().await;
    let csr = dummy_csr("device.example.com");
    setup.provider.create_csr(csr.clone()).await.unwrap();
    setup
        .provider
        .create_csr(dummy_csr("other.example.com"))
        .await
        .unwrap();

    // when
    let found = setup
        .provider
        .get_csr_by_sha256sum(&csr.sha256sum, &all_relations())
        .await
        .unwrap()
        .unwrap();
    let missing = setup
        .provider
        .get_csr_by_sha256sum(&"0".repeat(64), &all_relations())
        .await
        .unwrap();

    // then
    assert_eq!(found.id, csr.id);
    assert_eq!(
        found.subject_alt_names.unwrap()[0].kind(),
        SubjectAltNameKind::Dns
    );
    assert_eq!(found.certificates, Some(vec![]));
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_refreshable_and_unsigned_csrs() {
    // given
    let setup = setup().await;

    let signed = dummy_csr("signed.example.com");
    insert_csr(&setup.db, &signed).await;
    insert_certificate(
        &setup.db,
        dummy_certificate(signed.id, get_dummy_date(), Duration::days(2)),
    )
    .await;

    let unsigned = dummy_csr("unsigned.example.com");
    insert_csr(&setup.db, &unsigned).await;

    let mut rejected_signed = dummy_csr("rejected-signed.example.com");
    rejected_signed.rejected = true;
    insert_csr(&setup.db, &rejected_signed).await;
    insert_certificate(
        &setup.db,
        dummy_certificate(rejected_signed.id, get_dummy_date(), Duration::days(2)),
    )
    .await;

    let mut rejected_unsigned = dummy_csr("rejected-unsigned.example.com");
    rejected_unsigned.rejected = true;
    insert_csr(&setup.db, &rejected_unsigned).await;

    // when
    let refreshable = setup.provider.get_refreshable_csrs().await.unwrap();
    let unsigned_list = setup.provider.get_unsigned_csrs().await.unwrap();

    // then
    assert_eq!(
        refreshable.iter().map(|csr| csr.id).collect::<Vec<_>>(),
        vec![signed.id]
    );
    assert_eq!(
        unsigned_list.iter().map(|csr| csr.id).collect::<Vec<_>>(),
        vec![unsigned.id]
    );
    assert_eq!(setup.provider.count_unsigned_csrs().await.unwrap(), 1);
}

#[tokio::test]
async fn test_get_csr_list() {
    // given
    let setup = setup().await;

    let signed = dummy_csr("a.example.com");
    insert_csr(&setup.db, &signed).await;
    insert_certificate(
        &setup.db,
        dummy_certificate(signed.id, get_dummy_date(), Duration::days(7)),
    )
    .await;
    insert_certificate(
        &setup.db,
        dummy_certificate(signed.id, get_dummy_date(), Duration::days(2)),
    )
    .await;

    let unsigned = dummy_csr("b.example.com");
    insert_csr(&setup.db, &unsigned).await;

    let mut rejected = dummy_csr("c.example.com");
    rejected.rejected = true;
    insert_csr(&setup.db, &rejected).await;

    // when
    let list = setup.provider.get_csr_list().await.unwrap();

    // then
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, signed.id);
    assert_eq!(list[0].commonname, "a.example.com");
    assert_eq!(
        list[0].latest_not_after,
        Some(get_dummy_date() + Duration::days(7))
    );
    assert_eq!(list[1].id, unsigned.id);
    assert_eq!(list[1].latest_not_after, None);
}

#[tokio::test]
async fn test_reject_csr_is_idempotent() {
    // given
    let setup = setup().await;
    let csr = dummy_csr("device.example.com");
    insert_csr(&setup.db, &csr).await;

    // when
    setup.provider.reject_csr(&csr.id).await.unwrap();
    setup.provider.reject_csr(&csr.id).await.unwrap();

    // then
    let stored = entity::csr::Entity::find_by_id(csr.id)
        .one(&setup.db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.rejected);
}
