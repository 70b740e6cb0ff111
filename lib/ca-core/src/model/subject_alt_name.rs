use std::fmt;

use shared_types::{CsrId, SubjectAltNameId};
use strum::{Display, EnumString};

use crate::proto::subject_alt_name::normalize;
use crate::service::error::ValidationError;

/// A normalized subject alternative name. Only values accepted by
/// [`normalize`] can be constructed, so email and URI names never exist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubjectAltName {
    id: SubjectAltNameId,
    csr_id: CsrId,
    kind: SubjectAltNameKind,
    value: String,
}

impl SubjectAltName {
    pub fn new(
        csr_id: CsrId,
        kind: SubjectAltNameKind,
        raw: &str,
    ) -> Result<Self, ValidationError> {
        Self::with_id(SubjectAltNameId::new_random(), csr_id, kind, raw)
    }

    /// Rebuilds a stored name, `raw` is normalized again
    pub fn with_id(
        id: SubjectAltNameId,
        csr_id: CsrId,
        kind: SubjectAltNameKind,
        raw: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            csr_id,
            kind,
            value: normalize(kind, raw)?,
        })
    }

    pub fn id(&self) -> SubjectAltNameId {
        self.id
    }

    pub fn csr_id(&self) -> CsrId {
        self.csr_id
    }

    pub fn kind(&self) -> SubjectAltNameKind {
        self.kind
    }

    /// Normalized value, see [`crate::proto::subject_alt_name`]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for SubjectAltName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumString)]
pub enum SubjectAltNameKind {
    #[strum(serialize = "email")]
    Email,
    #[strum(serialize = "DNS")]
    Dns,
    #[strum(serialize = "IP")]
    Ip,
    #[strum(serialize = "URI")]
    Uri,
}

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct SubjectAltNameRelations {}
