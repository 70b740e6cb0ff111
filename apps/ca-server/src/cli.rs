//! Administrative subcommands of the `ca-server` binary.

use std::io::Write;
use std::path::PathBuf;

use ca_core::CaCore;
use ca_core::config::core_config::CaConfig;
use ca_core::proto::ca_generator::{
    self, CA_KEY_BITS, CaGenerationError, CaSubject, DEFAULT_COMMON_NAME, DEFAULT_ORGUNIT,
};
use ca_core::proto::certificate_request::format_subject;
use ca_core::provider::task::TaskType;
use ca_core::service::error::ServiceError;
use clap::{Args, Parser, Subcommand};
use shared_types::CsrId;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration files, applied after `config/config.yml` in the given order
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the submission API and run the periodic refresh (the default)
    Serve,
    /// Create a new CA key and self-signed certificate at the configured paths
    GenerateCa(GenerateCaArgs),
    #[command(flatten)]
    Admin(AdminCommand),
}

/// Subject of the generated CA, `OU` and `CN` always close it
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GenerateCaArgs {
    /// Two letter country code (C)
    #[arg(long)]
    pub country: Option<String>,
    /// State or province (ST)
    #[arg(long)]
    pub state: Option<String>,
    /// Locality (L)
    #[arg(long)]
    pub locality: Option<String>,
    /// Organization (O)
    #[arg(long)]
    pub organization: Option<String>,
    /// Organizational unit (OU)
    #[arg(long, default_value = DEFAULT_ORGUNIT)]
    pub orgunit: String,
    /// Common name (CN)
    #[arg(long, default_value = DEFAULT_COMMON_NAME)]
    pub common_name: String,
}

impl From<GenerateCaArgs> for CaSubject {
    fn from(args: GenerateCaArgs) -> Self {
        Self {
            country: args.country,
            state: args.state,
            locality: args.locality,
            organization: args.organization,
            orgunit: args.orgunit,
            common_name: args.common_name,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// List all CSRs that are not rejected
    List,
    /// Show one CSR with its certificates and access log
    Show { id: CsrId },
    /// Sign a CSR now
    Sign {
        id: CsrId,
        /// Use the long lifetime, backdated if configured
        #[arg(long)]
        long: bool,
    },
    /// Reject a CSR for good
    Reject { id: CsrId },
    /// Delete all certificates of a CSR but the current one
    Clean { id: CsrId },
    /// Delete all certificates but the current one, for every CSR
    CleanAll,
    /// Delete all certificates of a CSR
    Wipe { id: CsrId },
    /// Run one refresh pass
    Refresh,
    /// Run one autosign pass
    Autosign,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    CaGeneration(#[from] CaGenerationError),
    #[error("Failed writing output: {0}")]
    Output(#[from] std::io::Error),
}

pub async fn run_admin(
    core: &CaCore,
    command: AdminCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        AdminCommand::List => {
            for csr in core.csr_service.get_csr_list().await? {
                let latest = csr
                    .latest_not_after
                    .map(|not_after| not_after.to_string())
                    .unwrap_or_else(|| "-".to_owned());
                writeln!(
                    out,
                    "{}  {}  {}  {latest}",
                    csr.id, csr.sha256sum, csr.commonname
                )?;
            }
        }
        AdminCommand::Show { id } => {
            let csr = core.csr_service.get_csr(&id).await?;
            writeln!(out, "id:          {}", csr.id)?;
            writeln!(out, "sha256sum:   {}", csr.sha256sum)?;
            writeln!(out, "commonname:  {}", csr.commonname)?;
            writeln!(out, "orgunit:     {}", csr.orgunit)?;
            writeln!(out, "created:     {}", csr.created_date)?;
            writeln!(out, "rejected:    {}", csr.rejected)?;
            for name in &csr.subject_alt_names {
                writeln!(out, "san:         {name}")?;
            }
            for certificate in &csr.certificates {
                writeln!(
                    out,
                    "certificate: {}  {} .. {}",
                    certificate.id, certificate.not_before, certificate.not_after
                )?;
            }
            for entry in &csr.access_log {
                writeln!(out, "fetched:     {}  {}", entry.when, entry.addr)?;
            }
        }
        AdminCommand::Sign { id, long } => {
            let certificate = core
                .certificate_service
                .sign_csr_with_policy(&id, long)
                .await?;
            writeln!(
                out,
                "Signed {}: valid {} .. {}",
                certificate.csr_id, certificate.not_before, certificate.not_after
            )?;
        }
        AdminCommand::Reject { id } => {
            core.csr_service.reject_csr(&id).await?;
            writeln!(out, "Rejected {id}")?;
        }
        AdminCommand::Clean { id } => {
            let deleted = core.certificate_service.clean_csr(&id).await?;
            writeln!(out, "Deleted {deleted} superseded certificate(s) of {id}")?;
        }
        AdminCommand::CleanAll => {
            let deleted = core.certificate_service.clean_all().await?;
            writeln!(out, "Deleted {deleted} superseded certificate(s)")?;
        }
        AdminCommand::Wipe { id } => {
            let deleted = core.certificate_service.wipe_csr(&id).await?;
            writeln!(out, "Deleted {deleted} certificate(s) of {id}")?;
        }
        AdminCommand::Refresh => {
            let result = core.task_service.run(&TaskType::Refresh.to_string()).await?;
            writeln!(out, "{result}")?;
        }
        AdminCommand::Autosign => {
            let result = core
                .task_service
                .run(&TaskType::Autosign.to_string())
                .await?;
            writeln!(out, "{result}")?;
        }
    }

    Ok(())
}

/// Writes a new CA identity to the paths of `config`, never replacing existing files
pub async fn run_generate_ca(
    config: &CaConfig,
    args: GenerateCaArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    writeln!(out, "Generating a {CA_KEY_BITS}-bit RSA key, this may take a while")?;

    let generated = ca_generator::generate_files(
        &config.certificate,
        &config.key,
        &args.into(),
        CA_KEY_BITS,
        OffsetDateTime::now_utc(),
    )
    .await?;

    writeln!(out, "Subject: {}", format_subject(&generated.subject))?;
    writeln!(out, "Wrote key to {}", config.key.display())?;
    writeln!(out, "Wrote certificate to {}", config.certificate.display())?;
    Ok(())
}

#[cfg(test)]
mod test;
