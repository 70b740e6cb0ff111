//! Certificate issuance for stored CSRs.

use std::sync::Arc;

use extensions::GeneralName;
use rcgen::{
    CertificateParams, IsCa, PKCS_RSA_SHA256, PKCS_RSA_SHA512, SerialNumber, SignatureAlgorithm,
    SubjectPublicKeyInfo,
};
use shared_types::CertificateId;
use time::Duration;
use uuid::Uuid;
use x509_parser::prelude::{FromDer, X509CertificationRequest, X509Version};

use crate::model::certificate::{Certificate, CertificateLifetime};
use crate::model::csr::Csr;
use crate::model::subject_alt_name::{SubjectAltName, SubjectAltNameKind};
use crate::proto::certificate_request::{CertificateRequest, PublicKeyAlgorithm};
use crate::proto::clock::Clock;
use crate::proto::signing_cert::SigningCert;
use crate::proto::subject_alt_name;
use crate::repository::certificate_repository::SigningSession;
use crate::repository::error::DataLayerError;
use crate::service::error::{BusinessLogicError, InfrastructureError, ServiceError};
use crate::util::x509::authority_key_identifier;

mod extensions;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait CertificateSigner: Send + Sync {
    /// Produces a new certificate for `csr`, valid for `lifetime` from now.
    ///
    /// With `backdate` the certificate becomes valid at the CA's own `not_before`.
    /// `csr` must have its subject alternative names loaded.
    fn sign(
        &self,
        csr: &Csr,
        signing_cert: &SigningCert,
        lifetime: Duration,
        backdate: bool,
    ) -> Result<Certificate, ServiceError>;
}

pub struct CertificateSignerImpl {
    clock: Arc<dyn Clock>,
}

impl CertificateSignerImpl {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl CertificateSigner for CertificateSignerImpl {
    fn sign(
        &self,
        csr: &Csr,
        signing_cert: &SigningCert,
        lifetime: Duration,
        backdate: bool,
    ) -> Result<Certificate, ServiceError> {
        if csr.rejected {
            return Err(BusinessLogicError::CsrRejected(csr.sha256sum.to_owned()).into());
        }

        let request = CertificateRequest::parse(&csr.pem)?;
        let algorithm = signature_algorithm(request.public_key())?;

        let subject_alt_names = csr
            .subject_alt_names
            .as_ref()
            .ok_or_else(|| {
                ServiceError::MappingError("subject alternative names not loaded".to_owned())
            })?
            .iter()
            .map(general_name)
            .collect::<Result<Vec<_>, _>>()?;

        // extensions requested in the CSR and its signature algorithm are ignored
        let public_key = SubjectPublicKeyInfo::from_der(request.public_key_info()).map_err(
            |err| BusinessLogicError::UnsupportedKey {
                reason: err.to_string(),
            },
        )?;

        let now = self.clock.now_utc();

        let mut params = CertificateParams::default();
        params.distinguished_name = request.distinguished_name().clone();
        params.not_before = if backdate {
            signing_cert.not_before()
        } else {
            now
        };
        params.not_after = now + lifetime;
        params.serial_number = Some(SerialNumber::from(Uuid::now_v7().as_bytes().to_vec()));
        // every extension is written here, in this order
        params.is_ca = IsCa::NoCa;
        params.use_authority_key_identifier_extension = false;
        params.custom_extensions = [
            Some(extensions::basic_constraints()),
            Some(extensions::extended_key_usage()),
            extensions::subject_alt_name(&subject_alt_names),
            Some(extensions::subject_key_identifier(request.key_identifier())),
            Some(extensions::authority_key_identifier(signing_cert)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let issuer = signing_cert.issuer(algorithm)?;
        let issued = params
            .signed_by(&public_key, &issuer)
            .map_err(|err| InfrastructureError::Signing(err.to_string()))?;

        let lifetime = validate_issued(issued.der(), &request, signing_cert)?;

        tracing::info!(
            csr = %csr.sha256sum,
            not_before = %lifetime.not_before,
            not_after = %lifetime.not_after,
            "Signed certificate"
        );

        Ok(Certificate {
            id: CertificateId::new_random(),
            csr_id: csr.id,
            created_date: now,
            pem: issued.pem(),
            not_before: lifetime.not_before,
            not_after: lifetime.not_after,
        })
    }
}

/// Signs the CSR held by `session` and appends the certificate to its history
pub async fn issue(
    signer: Arc<dyn CertificateSigner>,
    session: Box<dyn SigningSession>,
    signing_cert: Arc<SigningCert>,
    lifetime: Duration,
    backdate: bool,
) -> Result<Certificate, ServiceError> {
    // RSA signing is CPU bound, keep it off the async workers
    let certificate = tokio::task::spawn_blocking({
        let csr = session.csr().clone();
        move || signer.sign(&csr, &signing_cert, lifetime, backdate)
    })
    .await
    .map_err(|err| ServiceError::MappingError(err.to_string()))??;

    session
        .commit(certificate.clone())
        .await
        .map_err(|err| match err {
            DataLayerError::RecordNotUpdated => ServiceError::from(
                BusinessLogicError::CsrRejected(session.csr().sha256sum.to_owned()),
            ),
            err => ServiceError::from(err),
        })?;

    Ok(certificate)
}

/// The digest follows the size of the key being certified
fn signature_algorithm(
    key: PublicKeyAlgorithm,
) -> Result<&'static SignatureAlgorithm, BusinessLogicError> {
    match key {
        PublicKeyAlgorithm::Rsa { bits: 2048 } => Ok(&PKCS_RSA_SHA256),
        PublicKeyAlgorithm::Rsa { bits: 4096 } => Ok(&PKCS_RSA_SHA512),
        PublicKeyAlgorithm::Rsa { bits: 1024 } => Err(BusinessLogicError::UnsupportedKey {
            reason: "1024-bit RSA requires SHA-1, which is not supported".to_owned(),
        }),
        PublicKeyAlgorithm::Rsa { bits } => Err(BusinessLogicError::UnsupportedKey {
            reason: format!("no digest for {bits}-bit RSA keys"),
        }),
        PublicKeyAlgorithm::Ec | PublicKeyAlgorithm::Other => {
            Err(BusinessLogicError::UnsupportedKey {
                reason: "only RSA keys are accepted".to_owned(),
            })
        }
    }
}

fn general_name(subject_alt_name: &SubjectAltName) -> Result<GeneralName, ServiceError> {
    let rendered = subject_alt_name::render(subject_alt_name.kind(), subject_alt_name.value())?;

    Ok(match subject_alt_name.kind() {
        SubjectAltNameKind::Dns => GeneralName::Dns(rendered),
        SubjectAltNameKind::Ip => GeneralName::Ip(rendered.parse().map_err(
            |err: std::net::AddrParseError| ServiceError::MappingError(err.to_string()),
        )?),
        // rejected by `render` already
        SubjectAltNameKind::Email | SubjectAltNameKind::Uri => {
            return Err(ServiceError::MappingError(format!(
                "unsupported subject alternative name {subject_alt_name}"
            )));
        }
    })
}

/// Parses the issued certificate back and checks it before it is stored
fn validate_issued(
    der: &[u8],
    request: &CertificateRequest,
    signing_cert: &SigningCert,
) -> Result<CertificateLifetime, BusinessLogicError> {
    let invalid = |message: &str| BusinessLogicError::IssuedCertificateInvalid(message.to_owned());

    let (_, certificate) =
        x509_parser::parse_x509_certificate(der).map_err(|err| invalid(&err.to_string()))?;

    if certificate.version() != X509Version::V3 {
        return Err(invalid("not a v3 certificate"));
    }

    match certificate.basic_constraints() {
        Ok(Some(constraints)) if constraints.critical && !constraints.value.ca => {}
        _ => return Err(invalid("basicConstraints must be critical CA:FALSE")),
    }

    match certificate.extended_key_usage() {
        Ok(Some(usage))
            if usage.critical && usage.value.client_auth && usage.value.server_auth => {}
        _ => {
            return Err(invalid(
                "extendedKeyUsage must be critical clientAuth, serverAuth",
            ));
        }
    }

    let validity = certificate.validity();
    let lifetime = CertificateLifetime {
        not_before: validity.not_before.to_datetime(),
        not_after: validity.not_after.to_datetime(),
    };
    if lifetime.not_after <= lifetime.not_before {
        return Err(invalid("not_after must be later than not_before"));
    }

    if authority_key_identifier(&certificate).map_err(|err| invalid(&err))?.as_deref()
        != Some(signing_cert.key_identifier())
    {
        return Err(invalid("authority key identifier does not match the CA"));
    }

    let (_, csr) = X509CertificationRequest::from_der(request.der())
        .map_err(|err| invalid(&err.to_string()))?;
    x509_parser::verify::verify_signature(
        certificate.public_key(),
        &csr.signature_algorithm,
        &csr.signature_value,
        csr.certification_request_info.raw,
    )
    .map_err(|_| invalid("certificate key does not verify the CSR signature"))?;

    Ok(lifetime)
}
