pub mod ca_generator;
pub mod certificate_request;
pub mod certificate_signer;
pub mod clock;
pub mod refresh_policy;
pub mod refresh_scheduler;
pub mod signing_cert;
pub mod subject_alt_name;
