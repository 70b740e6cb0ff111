//! The CA identity used for signing.

use std::path::Path;

use rcgen::{Issuer, KeyPair, SignatureAlgorithm};
use secrecy::{ExposeSecret, SecretString};
use time::OffsetDateTime;
use x509_parser::pem::parse_x509_pem;

use crate::proto::certificate_request::{SubjectComponent, attribute_short_name};
use crate::service::error::InfrastructureError;
use crate::util::x509::key_identifier;

/// CA certificate and private key. Loaded once, shared read-only between signing tasks.
pub struct SigningCert {
    certificate_pem: String,
    key_pem: SecretString,
    subject: Vec<SubjectComponent>,
    not_before: OffsetDateTime,
    issuer_name_der: Vec<u8>,
    serial: Vec<u8>,
    key_identifier: Vec<u8>,
}

impl SigningCert {
    /// `key_pem` must be an unencrypted PKCS#8 key matching the certificate
    pub fn from_pem(
        certificate_pem: &str,
        key_pem: SecretString,
    ) -> Result<Self, InfrastructureError> {
        let certificate_error = |message: String| InfrastructureError::SigningCertificate(message);

        let (_, block) = parse_x509_pem(certificate_pem.as_bytes())
            .map_err(|err| certificate_error(format!("bad PEM: {err}")))?;
        let certificate = block
            .parse_x509()
            .map_err(|err| certificate_error(format!("bad certificate: {err}")))?;

        let key_pair = KeyPair::from_pem(key_pem.expose_secret())
            .map_err(|err| InfrastructureError::SigningKey(err.to_string()))?;
        if key_pair.public_key_raw() != certificate.public_key().subject_public_key.data.as_ref() {
            return Err(InfrastructureError::SigningKey(
                "key does not match the CA certificate".to_owned(),
            ));
        }

        let subject = certificate
            .subject()
            .iter_rdn()
            .flat_map(|rdn| rdn.iter())
            .filter_map(|attribute| {
                let value = attribute.as_str().ok()?;
                Some(SubjectComponent::new(
                    attribute_short_name(attribute.attr_type()),
                    value,
                ))
            })
            .collect();

        Ok(Self {
            certificate_pem: certificate_pem.to_owned(),
            subject,
            not_before: certificate.validity().not_before.to_datetime(),
            issuer_name_der: certificate.issuer().as_raw().to_vec(),
            serial: certificate.raw_serial().to_vec(),
            key_identifier: key_identifier(&certificate).map_err(certificate_error)?,
            key_pem,
        })
    }

    pub async fn load(
        certificate_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
    ) -> Result<Self, InfrastructureError> {
        let certificate_path = certificate_path.as_ref();
        let certificate_pem = tokio::fs::read_to_string(certificate_path)
            .await
            .map_err(|err| {
                InfrastructureError::SigningCertificate(format!(
                    "failed to read {}: {err}",
                    certificate_path.display()
                ))
            })?;

        let key_path = key_path.as_ref();
        let key_pem = tokio::fs::read_to_string(key_path).await.map_err(|err| {
            InfrastructureError::SigningKey(format!("failed to read {}: {err}", key_path.display()))
        })?;

        tracing::debug!(certificate = %certificate_path.display(), "Loaded CA identity");
        Self::from_pem(&certificate_pem, SecretString::from(key_pem))
    }

    /// CA subject components named in `selector`, in selector order. Unknown names are skipped.
    pub fn subject_prefix(&self, selector: &[String]) -> Vec<SubjectComponent> {
        selector
            .iter()
            .filter_map(|attribute| {
                self.subject
                    .iter()
                    .find(|component| &component.attribute == attribute)
                    .cloned()
            })
            .collect()
    }

    pub fn subject(&self) -> &[SubjectComponent] {
        &self.subject
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn certificate_pem(&self) -> &str {
        &self.certificate_pem
    }

    pub(crate) fn key_identifier(&self) -> &[u8] {
        &self.key_identifier
    }

    /// DER encoded issuer name of the CA certificate
    pub(crate) fn issuer_name_der(&self) -> &[u8] {
        &self.issuer_name_der
    }

    pub(crate) fn serial(&self) -> &[u8] {
        &self.serial
    }

    pub(crate) fn issuer(
        &self,
        algorithm: &'static SignatureAlgorithm,
    ) -> Result<Issuer<'static, KeyPair>, InfrastructureError> {
        let key_pair = KeyPair::from_pem_and_sign_algo(self.key_pem.expose_secret(), algorithm)
            .map_err(|err| InfrastructureError::SigningKey(err.to_string()))?;

        Issuer::from_ca_cert_pem(&self.certificate_pem, key_pair)
            .map_err(|err| InfrastructureError::SigningCertificate(err.to_string()))
    }
}
