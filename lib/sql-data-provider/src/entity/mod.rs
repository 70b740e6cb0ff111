pub mod access_log;
pub mod certificate;
pub mod csr;
pub mod subject_alt_name;
