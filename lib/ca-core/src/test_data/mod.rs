//! PEM fixtures. The CA is a self-signed RSA 2048 root with subject
//! `C=SE, ST=Ostergotland, L=Linkoping, O=Example AB, CN=Caramel Test CA`.

pub(crate) const CA_CERTIFICATE: &str = include_str!("ca.crt");
pub(crate) const CA_KEY: &str = include_str!("ca.key");
/// Unrelated RSA 2048 key, does not match [`CA_CERTIFICATE`].
pub(crate) const OTHER_KEY: &str = include_str!("other.key");

/// RSA 2048, CA prefix, `OU=Devices, CN=device.example.com`
pub(crate) const GOOD_CSR: &str = include_str!("good.csr");
/// RSA 4096, CA prefix, `OU=Devices`, uuid common name
pub(crate) const UUID_CSR: &str = include_str!("uuid.csr");
pub(crate) const UUID_CSR_COMMON_NAME: &str = "9a5b2c1e-4f7d-4e0a-8b3c-2d1e0f9a8b7c";
/// RSA 2048, `C=US, ST=California, L=Palo Alto, O=Other Inc, OU=Lab, CN=other.example.org`
pub(crate) const FOREIGN_CSR: &str = include_str!("foreign.csr");
/// CA prefix and `OU=Devices`, no common name
pub(crate) const NO_COMMON_NAME_CSR: &str = include_str!("nocn.csr");
/// `OU=Kitchen, CN=räksmörgås.se`
pub(crate) const IDN_CSR: &str = include_str!("idn.csr");
/// P-256 key, `CN=ec.example.com`
pub(crate) const EC_CSR: &str = include_str!("ec.csr");
/// RSA 3072 key, `CN=odd.example.com`
pub(crate) const RSA_3072_CSR: &str = include_str!("rsa3072.csr");
/// RSA 1024 key, `CN=legacy.example.com`
pub(crate) const RSA_1024_CSR: &str = include_str!("small.csr");
/// RSA 2048, CA prefix, `OU=Devices, CN=ski.example.com`, requests
/// `subjectKeyIdentifier` and `keyUsage`
pub(crate) const REQUESTED_EXTENSIONS_CSR: &str = include_str!("ski.csr");
/// RSA 2048, CA prefix, `OU=Devices, CN=sha1.example.com`, signed with SHA-1
pub(crate) const SHA1_SIGNED_CSR: &str = include_str!("sha1.csr");
/// CA prefix, `OU=Devices, OU=Lab, CN=dup.example.com`
pub(crate) const REPEATED_ATTRIBUTE_CSR: &str = include_str!("repeated.csr");
/// [`GOOD_CSR`] with a corrupted signature
pub(crate) const BAD_SIGNATURE_CSR: &str = include_str!("badsig.csr");

pub(crate) fn sha256_hex(data: &str) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(data.as_bytes()))
}

pub(crate) fn signing_cert() -> crate::proto::signing_cert::SigningCert {
    crate::proto::signing_cert::SigningCert::from_pem(
        CA_CERTIFICATE,
        secrecy::SecretString::from(CA_KEY.to_owned()),
    )
    .unwrap()
}
