use clap::Parser;
use shared_types::CsrId;

use super::{AdminCommand, Cli, Command, GenerateCaArgs};

const ID: &str = "0195512e-6f2c-7a8c-bb1d-2f0ee1f0c0de";

#[test]
fn test_no_subcommand_serves() {
    let cli = Cli::try_parse_from(["ca-server"]).unwrap();

    assert_eq!(cli.command, None);
    assert!(cli.config.is_empty());
}

#[test]
fn test_config_files_after_subcommand() {
    let cli = Cli::try_parse_from([
        "ca-server",
        "list",
        "-c",
        "local.yml",
        "--config",
        "secrets.json",
    ])
    .unwrap();

    assert_eq!(cli.command, Some(Command::Admin(AdminCommand::List)));
    assert_eq!(
        cli.config,
        vec![
            std::path::PathBuf::from("local.yml"),
            std::path::PathBuf::from("secrets.json")
        ]
    );
}

#[test]
fn test_sign_long() {
    let cli = Cli::try_parse_from(["ca-server", "sign", ID, "--long"]).unwrap();

    assert_eq!(
        cli.command,
        Some(Command::Admin(AdminCommand::Sign {
            id: ID.parse::<CsrId>().unwrap(),
            long: true,
        }))
    );
}

#[test]
fn test_sign_short_by_default() {
    let cli = Cli::try_parse_from(["ca-server", "sign", ID]).unwrap();

    assert!(matches!(
        cli.command,
        Some(Command::Admin(AdminCommand::Sign { long: false, .. }))
    ));
}

#[test]
fn test_invalid_id_rejected() {
    assert!(Cli::try_parse_from(["ca-server", "wipe", "not-a-uuid"]).is_err());
}

#[test]
fn test_serve_explicit() {
    let cli = Cli::try_parse_from(["ca-server", "serve"]).unwrap();

    assert_eq!(cli.command, Some(Command::Serve));
}

#[test]
fn test_clean_all() {
    let cli = Cli::try_parse_from(["ca-server", "clean-all"]).unwrap();

    assert_eq!(cli.command, Some(Command::Admin(AdminCommand::CleanAll)));
}

#[test]
fn test_generate_ca_defaults() {
    let cli = Cli::try_parse_from([
        "ca-server",
        "generate-ca",
        "--country",
        "SE",
        "--organization",
        "Example AB",
    ])
    .unwrap();

    assert_eq!(
        cli.command,
        Some(Command::GenerateCa(GenerateCaArgs {
            country: Some("SE".to_owned()),
            state: None,
            locality: None,
            organization: Some("Example AB".to_owned()),
            orgunit: "Caramel".to_owned(),
            common_name: "Caramel Signing Certificate".to_owned(),
        }))
    );
}
