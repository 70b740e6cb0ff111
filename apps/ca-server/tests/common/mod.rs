#![allow(dead_code)]

use std::sync::Arc;

use ca_core::CaCore;
use ca_core::config::core_config::{AppConfig, InputFormat, NoCustomConfig};
use ca_server::ServerConfig;
use ca_server::router::start_server;
use sea_orm::DatabaseConnection;
use sha2::{Digest, Sha256};
use sql_data_provider::{DataLayer, db_conn};

macro_rules! test_data {
    ($file:literal) => {
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../lib/ca-core/src/test_data/", $file)
    };
}

pub const GOOD_CSR: &str = include_str!(test_data!("good.csr"));
pub const FOREIGN_CSR: &str = include_str!(test_data!("foreign.csr"));
pub const UUID_CSR: &str = include_str!(test_data!("uuid.csr"));

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub struct TestContext {
    pub core: CaCore,
    pub db: DatabaseConnection,
}

pub async fn setup() -> TestContext {
    let config = format!(
        "
ca:
    certificate: '{}'
    key: '{}'
lifetime:
    short: 172800
    long: 604800
    backdate: true
",
        test_data!("ca.crt"),
        test_data!("ca.key"),
    );

    let config = AppConfig::<NoCustomConfig>::parse(vec![InputFormat::yaml_str(config)])
        .unwrap()
        .core;

    let db = db_conn("sqlite::memory:").await.unwrap();
    let core = CaCore::new(Arc::new(DataLayer::build(db.clone())), config)
        .await
        .unwrap();

    TestContext { core, db }
}

/// Serves `core` on an ephemeral port, returns the base url
pub fn spawn_server(core: CaCore) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let config = ServerConfig {
        core_base_url: base_url.clone(),
        ..Default::default()
    };
    tokio::spawn(start_server(listener, Arc::new(config), core));

    base_url
}
