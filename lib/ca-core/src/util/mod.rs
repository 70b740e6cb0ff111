pub(crate) mod x509;
