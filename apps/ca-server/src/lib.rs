use std::net::IpAddr;

use serde::{Deserialize, Serialize};

pub mod cli;
pub mod dto;
pub mod endpoint;
pub mod metrics;
pub mod router;
pub mod scheduler;

mod middleware;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub database_url: String,
    pub server_ip: Option<IpAddr>,
    pub server_port: Option<u16>,
    pub trace_json: Option<bool>,
    pub trace_level: Option<String>,
    /// Public base of the submission routes, reported back to submitting clients
    pub core_base_url: String,
}
