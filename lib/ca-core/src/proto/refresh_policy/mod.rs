//! Half-life refresh rules.
//!
//! A certificate is due for refresh once half of its lifetime, capped at the long
//! lifetime, has passed. Long-lived certificates are renewed long-lived, everything
//! else falls back to the short lifetime.

use time::{Duration, OffsetDateTime};

use crate::model::certificate::CertificateLifetime;
use crate::service::error::BusinessLogicError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RefreshPolicy {
    pub short: Duration,
    pub long: Duration,
    /// Whether long-lived certificates start at the CA's own `not_before`
    pub backdate: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefreshState {
    Unsigned,
    Rejected,
    Fresh,
    Due,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SigningTarget {
    pub lifetime: Duration,
    pub backdate: bool,
}

impl RefreshPolicy {
    pub fn half_life(&self, current: &CertificateLifetime) -> Duration {
        current.duration().min(self.long) / 2
    }

    pub fn state(
        &self,
        rejected: bool,
        current: Option<&CertificateLifetime>,
        now: OffsetDateTime,
    ) -> RefreshState {
        if rejected {
            return RefreshState::Rejected;
        }

        match current {
            None => RefreshState::Unsigned,
            // the exact half-life instant already counts as due
            Some(current) if now >= current.not_after - self.half_life(current) => {
                RefreshState::Due
            }
            Some(_) => RefreshState::Fresh,
        }
    }

    /// Lifetime and backdating for the next certificate after `current`
    pub fn target(&self, current: &CertificateLifetime) -> SigningTarget {
        if current.duration() >= self.long {
            SigningTarget {
                lifetime: self.long,
                backdate: self.backdate,
            }
        } else {
            SigningTarget {
                lifetime: self.short,
                backdate: false,
            }
        }
    }

    /// Manual signing never shortens an outstanding certificate, and only long-lived
    /// certificates may be backdated.
    pub fn check_manual(
        &self,
        current: Option<&CertificateLifetime>,
        target: &SigningTarget,
        now: OffsetDateTime,
    ) -> Result<(), BusinessLogicError> {
        if target.backdate && target.lifetime < self.long {
            return Err(BusinessLogicError::BackdateRequiresLongLifetime);
        }

        match current {
            Some(current) if current.not_after > now + target.lifetime => {
                Err(BusinessLogicError::LongLivedCertificateOutstanding {
                    not_after: current.not_after,
                })
            }
            _ => Ok(()),
        }
    }

    /// Target of a manual signing, `long` selects the long lifetime with the configured backdating
    pub fn manual_target(&self, long: bool) -> SigningTarget {
        if long {
            SigningTarget {
                lifetime: self.long,
                backdate: self.backdate,
            }
        } else {
            SigningTarget {
                lifetime: self.short,
                backdate: false,
            }
        }
    }
}

#[cfg(test)]
mod test;
