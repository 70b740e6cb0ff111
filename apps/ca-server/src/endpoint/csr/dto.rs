use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub(crate) struct SubmitCsrResponseRestDTO {
    pub sha256: String,
    /// Where the certificate can be fetched once signed
    pub url: String,
}
