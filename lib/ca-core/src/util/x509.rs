use sha2::{Digest, Sha256};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::ParsedExtension;
use x509_parser::oid_registry::{
    OID_X509_EXT_AUTHORITY_KEY_IDENTIFIER, OID_X509_EXT_SUBJECT_KEY_IDENTIFIER,
};

/// Length of a key identifier derived from a SHA-256 hash
const KEY_IDENTIFIER_LENGTH: usize = 20;

pub(crate) fn subject_key_identifier(cert: &X509Certificate) -> Result<Option<Vec<u8>>, String> {
    cert.get_extension_unique(&OID_X509_EXT_SUBJECT_KEY_IDENTIFIER)
        .map_err(|err| format!("failed to get subject key identifier: {err}"))?
        .map(|ext| match ext.parsed_extension() {
            ParsedExtension::SubjectKeyIdentifier(key_identifier) => Ok(key_identifier.0.to_vec()),
            _ => Err("unexpected extension while looking for subject key identifier".to_owned()),
        })
        .transpose()
}

pub(crate) fn authority_key_identifier(
    cert: &X509Certificate,
) -> Result<Option<Vec<u8>>, String> {
    cert.get_extension_unique(&OID_X509_EXT_AUTHORITY_KEY_IDENTIFIER)
        .map_err(|err| format!("failed to get authority key identifier: {err}"))?
        .map(|ext| match ext.parsed_extension() {
            ParsedExtension::AuthorityKeyIdentifier(aki) => Ok(aki
                .key_identifier
                .as_ref()
                .map(|key_identifier| key_identifier.0.to_vec())),
            _ => Err("unexpected extension while looking for authority key identifier".to_owned()),
        })
        .transpose()
        .map(Option::flatten)
}

/// Truncated SHA-256 of the `subjectPublicKey` bits (RFC 7093, method 1)
pub(crate) fn public_key_identifier(subject_public_key: &[u8]) -> Vec<u8> {
    Sha256::digest(subject_public_key)[..KEY_IDENTIFIER_LENGTH].to_vec()
}

/// Subject key identifier of `cert`, derived from its public key when the extension is absent
pub(crate) fn key_identifier(cert: &X509Certificate) -> Result<Vec<u8>, String> {
    Ok(match subject_key_identifier(cert)? {
        Some(key_identifier) => key_identifier,
        None => public_key_identifier(cert.public_key().subject_public_key.data.as_ref()),
    })
}

#[cfg(test)]
mod tests {
    use x509_parser::pem::parse_x509_pem;

    use super::*;
    use crate::test_data::CA_CERTIFICATE;

    #[test]
    fn test_subject_key_identifier() {
        let (_, pem) = parse_x509_pem(CA_CERTIFICATE.as_bytes()).unwrap();
        let cert = pem.parse_x509().unwrap();

        let identifier = subject_key_identifier(&cert).unwrap().unwrap();
        assert_eq!(
            hex::encode(&identifier),
            "c25c4fc116f4b2f53dbbf6fe669ba7c460408a02"
        );
        assert_eq!(key_identifier(&cert).unwrap(), identifier);
        assert_eq!(authority_key_identifier(&cert).unwrap(), None);
    }
}
