pub mod certificate;
pub mod csr;
pub mod error;
pub mod task;

#[cfg(test)]
pub(crate) mod test_utilities;
