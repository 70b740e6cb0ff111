//! Bounded-parallel signing passes over the stored CSRs.

use std::sync::Arc;

use serde::Serialize;
use time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::model::csr::Csr;
use crate::proto::certificate_signer::{CertificateSigner, issue};
use crate::proto::clock::Clock;
use crate::proto::refresh_policy::{RefreshPolicy, RefreshState, SigningTarget};
use crate::proto::signing_cert::SigningCert;
use crate::repository::certificate_repository::CertificateRepository;
use crate::repository::csr_repository::CsrRepository;
use crate::service::error::ServiceError;

pub const DEFAULT_CONCURRENCY: usize = 16;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped_fresh: usize,
    pub skipped_unsigned: usize,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosignSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

pub struct RefreshScheduler {
    csr_repository: Arc<dyn CsrRepository>,
    certificate_repository: Arc<dyn CertificateRepository>,
    signer: Arc<dyn CertificateSigner>,
    clock: Arc<dyn Clock>,
    concurrency: usize,
}

struct Job {
    csr: Csr,
    target: SigningTarget,
}

#[derive(Default)]
struct PoolOutcome {
    succeeded: usize,
    failed: usize,
}

impl RefreshScheduler {
    pub fn new(
        csr_repository: Arc<dyn CsrRepository>,
        certificate_repository: Arc<dyn CertificateRepository>,
        signer: Arc<dyn CertificateSigner>,
        clock: Arc<dyn Clock>,
        concurrency: usize,
    ) -> Self {
        Self {
            csr_repository,
            certificate_repository,
            signer,
            clock,
            concurrency: concurrency.max(1),
        }
    }

    /// Re-signs every CSR whose current certificate is past its half-life.
    ///
    /// Only enumeration failures are returned, failures of single signings are counted and logged.
    pub async fn refresh_all(
        &self,
        signing_cert: Arc<SigningCert>,
        policy: RefreshPolicy,
    ) -> Result<RefreshSummary, ServiceError> {
        let refreshable = self.csr_repository.get_refreshable_csrs().await?;
        let skipped_unsigned = self.csr_repository.count_unsigned_csrs().await? as usize;
        let lifetimes = self.certificate_repository.get_latest_lifetimes().await?;
        let now = self.clock.now_utc();

        let mut summary = RefreshSummary {
            skipped_unsigned,
            ..Default::default()
        };

        let mut jobs = vec![];
        for csr in refreshable {
            let current = lifetimes.get(&csr.id);
            match policy.state(csr.rejected, current, now) {
                RefreshState::Due => {
                    if let Some(current) = current {
                        jobs.push(Job {
                            target: policy.target(current),
                            csr,
                        });
                    }
                }
                RefreshState::Fresh => summary.skipped_fresh += 1,
                // signed or rejected after the snapshot
                RefreshState::Unsigned | RefreshState::Rejected => summary.skipped_unsigned += 1,
            }
        }

        summary.attempted = jobs.len();
        tracing::debug!(
            due = summary.attempted,
            fresh = summary.skipped_fresh,
            "Starting refresh pass"
        );

        let outcome = self.run_pool(signing_cert, jobs).await;
        summary.succeeded = outcome.succeeded;
        summary.failed = outcome.failed;

        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Refresh pass finished"
        );
        Ok(summary)
    }

    /// Signs every unsigned CSR whose common name is a UUID, with `lifetime` and without backdating
    pub async fn autosign_all(
        &self,
        signing_cert: Arc<SigningCert>,
        lifetime: Duration,
    ) -> Result<AutosignSummary, ServiceError> {
        let unsigned = self.csr_repository.get_unsigned_csrs().await?;

        let mut summary = AutosignSummary::default();
        let mut jobs = vec![];
        for csr in unsigned {
            if csr.rejected || Uuid::parse_str(&csr.commonname).is_err() {
                summary.skipped += 1;
                continue;
            }
            jobs.push(Job {
                csr,
                target: SigningTarget {
                    lifetime,
                    backdate: false,
                },
            });
        }

        summary.attempted = jobs.len();
        if summary.attempted == 0 {
            return Ok(summary);
        }

        let outcome = self.run_pool(signing_cert, jobs).await;
        summary.succeeded = outcome.succeeded;
        summary.failed = outcome.failed;

        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Autosign pass finished"
        );
        Ok(summary)
    }

    async fn run_pool(&self, signing_cert: Arc<SigningCert>, jobs: Vec<Job>) -> PoolOutcome {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for Job { csr, target } in jobs {
            let semaphore = semaphore.clone();
            let certificate_repository = self.certificate_repository.clone();
            let signer = self.signer.clone();
            let signing_cert = signing_cert.clone();

            tasks.spawn(async move {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => {
                        sign_one(
                            certificate_repository.as_ref(),
                            signer,
                            signing_cert,
                            &csr,
                            target,
                        )
                        .await
                    }
                    Err(err) => Err(ServiceError::MappingError(err.to_string())),
                };

                (csr.sha256sum, result)
            });
        }

        let mut outcome = PoolOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(_))) => outcome.succeeded += 1,
                Ok((csr, Err(error))) => {
                    tracing::warn!(csr = %csr, %error, "Failed to sign certificate");
                    outcome.failed += 1;
                }
                Err(error) => {
                    tracing::error!(%error, "Signing task aborted");
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}

async fn sign_one(
    certificate_repository: &dyn CertificateRepository,
    signer: Arc<dyn CertificateSigner>,
    signing_cert: Arc<SigningCert>,
    csr: &Csr,
    target: SigningTarget,
) -> Result<(), ServiceError> {
    let session = certificate_repository.open_signing_session(&csr.id).await?;
    issue(signer, session, signing_cert, target.lifetime, target.backdate).await?;
    Ok(())
}
