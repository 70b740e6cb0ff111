pub mod csr;
pub mod misc;
