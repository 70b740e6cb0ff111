use shared_types::{AccessLogId, CsrId};
use time::OffsetDateTime;

/// One certificate fetch attempt on a known CSR
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessLog {
    pub id: AccessLogId,
    pub csr_id: CsrId,
    pub when: OffsetDateTime,
    pub addr: String,
}
