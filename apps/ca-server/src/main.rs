use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;

use ca_core::CaCore;
use ca_core::config::core_config::AppConfig;
use ca_server::cli::{Cli, CliError, Command, run_admin, run_generate_ca};
use ca_server::router::start_server;
use ca_server::scheduler::spawn_periodic_tasks;
use ca_server::{ServerConfig, metrics};
use clap::Parser;
use sql_data_provider::DataLayer;
use tracing_subscriber::prelude::*;

fn main() {
    let cli = Cli::parse();

    let mut config_files = cli.config;
    config_files.insert(0, "config/config.yml".into());

    let app_config: AppConfig<ServerConfig> =
        AppConfig::from_files(&config_files).expect("Failed creating config");

    initialize_tracing(&app_config.app);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
        .block_on(async move {
            match cli.command.unwrap_or(Command::Serve) {
                Command::Serve => {
                    let core = init_core(&app_config).await;
                    serve(app_config.app, core).await
                }
                Command::GenerateCa(args) => exit_on_error(
                    run_generate_ca(&app_config.core.ca, args, &mut std::io::stdout()).await,
                ),
                Command::Admin(command) => {
                    let core = init_core(&app_config).await;
                    exit_on_error(run_admin(&core, command, &mut std::io::stdout()).await)
                }
            }
        })
}

async fn init_core(app_config: &AppConfig<ServerConfig>) -> CaCore {
    let db_conn = sql_data_provider::db_conn(app_config.app.database_url.as_str())
        .await
        .expect("Failed to connect to database");

    CaCore::new(
        Arc::new(DataLayer::build(db_conn)),
        app_config.core.clone(),
    )
    .await
    .expect("Failed to initialize core")
}

fn exit_on_error(result: Result<(), CliError>) {
    if let Err(error) = result {
        tracing::error!(%error, "Command failed");
        std::process::exit(1);
    }
}

async fn serve(config: ServerConfig, core: CaCore) {
    metrics::setup().expect("Failed registering metrics");

    let addr = SocketAddr::new(
        config
            .server_ip
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))),
        config.server_port.unwrap_or(8080),
    );
    let listener = TcpListener::bind(addr).expect("Failed to bind to address");

    let periodic = spawn_periodic_tasks(&core);

    start_server(listener, Arc::new(config), core)
        .await
        .expect("Failed to start axum server");

    periodic.iter().for_each(|handle| handle.abort());
}

fn initialize_tracing(config: &ServerConfig) {
    // Create a filter based on the log level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| {
            tracing_subscriber::EnvFilter::try_new(
                config.trace_level.as_deref().unwrap_or("info"),
            )
        })
        .expect("Failed to create env filter");

    let tracing_layer = tracing_subscriber::registry().with(filter);

    if config.trace_json.unwrap_or_default() {
        tracing_layer
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init();
    } else {
        tracing_layer.with(tracing_subscriber::fmt::layer()).init();
    };
}
