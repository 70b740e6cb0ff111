use ca_core::model::access_log::AccessLog;
use ca_core::repository::access_log_repository::AccessLogRepository;
use ca_core::repository::error::DataLayerError;
use similar_asserts::assert_eq;
use time::Duration;
use uuid::Uuid;

use super::AccessLogProvider;
use crate::test_utilities::{
    dummy_csr, get_dummy_date, insert_csr, setup_test_data_layer_and_connection,
};

#[tokio::test]
async fn test_access_log_newest_first() {
    // given
    let data_layer = setup_test_data_layer_and_connection().await;
    let provider = AccessLogProvider {
        db: data_layer.db.clone(),
    };
    let csr = dummy_csr("device.example.com");
    insert_csr(&data_layer.db, &csr).await;

    let first = AccessLog {
        id: Uuid::new_v4().into(),
        csr_id: csr.id,
        when: get_dummy_date(),
        addr: "192.0.2.1".to_owned(),
    };
    let second = AccessLog {
        id: Uuid::new_v4().into(),
        csr_id: csr.id,
        when: get_dummy_date() + Duration::minutes(5),
        addr: "2001:db8::1".to_owned(),
    };

    // when
    provider.create_access_log(first.clone()).await.unwrap();
    provider.create_access_log(second.clone()).await.unwrap();

    // then
    let list = provider.get_access_log_list(&csr.id).await.unwrap();
    assert_eq!(list, vec![second, first]);
}

#[tokio::test]
async fn test_access_log_unknown_csr() {
    let data_layer = setup_test_data_layer_and_connection().await;
    let provider = AccessLogProvider {
        db: data_layer.db.clone(),
    };

    let result = provider
        .create_access_log(AccessLog {
            id: Uuid::new_v4().into(),
            csr_id: Uuid::new_v4().into(),
            when: get_dummy_date(),
            addr: "192.0.2.1".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(DataLayerError::IncorrectParameters)));
}
