//! Creation of the self-signed CA identity of a new installation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, DnValue, IsCa, KeyPair,
    KeyUsagePurpose, PKCS_RSA_SHA512, SerialNumber,
};
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::proto::certificate_request::{SubjectComponent, format_subject};

pub const CA_KEY_BITS: usize = 4096;
pub const DEFAULT_COMMON_NAME: &str = "Caramel Signing Certificate";
pub const DEFAULT_ORGUNIT: &str = "Caramel";
/// Validity of a generated CA, in calendar years
pub const CA_VALIDITY_YEARS: i32 = 24;

#[derive(Debug, Error)]
pub enum CaGenerationError {
    #[error("Invalid CA subject: {0}")]
    InvalidSubject(String),
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),
    #[error("Certificate generation failed: {0}")]
    Certificate(#[from] rcgen::Error),
    #[error("Invalid validity: {0}")]
    Validity(#[from] time::error::ComponentRange),
    #[error("File already exists: {}, refusing to overwrite", .0.display())]
    AlreadyExists(PathBuf),
    #[error("Failed writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Generation task failed: {0}")]
    Task(String),
}

/// Subject of a generated CA. Blank optional attributes are left out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaSubject {
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub orgunit: String,
    pub common_name: String,
}

impl Default for CaSubject {
    fn default() -> Self {
        Self {
            country: None,
            state: None,
            locality: None,
            organization: None,
            orgunit: DEFAULT_ORGUNIT.to_owned(),
            common_name: DEFAULT_COMMON_NAME.to_owned(),
        }
    }
}

impl CaSubject {
    /// Subject in certificate order, `OU` second to last and `CN` last
    pub fn components(&self) -> Result<Vec<SubjectComponent>, CaGenerationError> {
        let optional = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned)
        };
        let required = |attribute: &str, value: &str| {
            let value = value.trim();
            if value.is_empty() {
                return Err(CaGenerationError::InvalidSubject(format!(
                    "{attribute} must not be empty"
                )));
            }
            Ok(value.to_owned())
        };

        let country = optional(&self.country).map(|country| country.to_ascii_uppercase());
        if let Some(country) = &country {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(CaGenerationError::InvalidSubject(format!(
                    "country `{country}` is not a two letter code"
                )));
            }
        }

        let components = [
            ("C", country),
            ("ST", optional(&self.state)),
            ("L", optional(&self.locality)),
            ("O", optional(&self.organization)),
            ("OU", Some(required("OU", &self.orgunit)?)),
            ("CN", Some(required("CN", &self.common_name)?)),
        ];

        Ok(components
            .into_iter()
            .filter_map(|(attribute, value)| {
                value.map(|value| SubjectComponent::new(attribute, value))
            })
            .collect())
    }

    fn distinguished_name(&self) -> Result<DistinguishedName, CaGenerationError> {
        let mut distinguished_name = DistinguishedName::new();
        for SubjectComponent { attribute, value } in self.components()? {
            let (dn_type, value) = match attribute.as_str() {
                "C" => (
                    DnType::CountryName,
                    DnValue::PrintableString(value.try_into()?),
                ),
                "ST" => (DnType::StateOrProvinceName, DnValue::from(value)),
                "L" => (DnType::LocalityName, DnValue::from(value)),
                "O" => (DnType::OrganizationName, DnValue::from(value)),
                "OU" => (DnType::OrganizationalUnitName, DnValue::from(value)),
                _ => (DnType::CommonName, DnValue::from(value)),
            };
            distinguished_name.push(dn_type, value);
        }

        Ok(distinguished_name)
    }
}

pub struct GeneratedCa {
    pub certificate_pem: String,
    pub key_pem: SecretString,
    pub subject: Vec<SubjectComponent>,
}

/// New RSA key as PKCS#8, usable with SHA-512 signatures
pub fn generate_key(bits: usize) -> Result<(KeyPair, SecretString), CaGenerationError> {
    let key_error = |err: String| CaGenerationError::KeyGeneration(err);

    let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), bits)
        .map_err(|err| key_error(err.to_string()))?;
    let key_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|err| key_error(err.to_string()))?;
    let key_pair = KeyPair::from_pem_and_sign_algo(key_pem.as_str(), &PKCS_RSA_SHA512)?;

    Ok((key_pair, SecretString::from(key_pem.as_str().to_owned())))
}

/// Self-signed CA certificate for `key_pair`, valid from `now` on.
///
/// Carries `basicConstraints` CA with path length 0 and `keyUsage` keyCertSign, both critical,
/// plus matching subject and authority key identifiers.
pub fn self_signed(
    key_pair: &KeyPair,
    subject: &CaSubject,
    now: OffsetDateTime,
) -> Result<String, CaGenerationError> {
    let mut params = CertificateParams::default();
    params.distinguished_name = subject.distinguished_name()?;
    params.not_before = now;
    params.not_after = years_later(now, CA_VALIDITY_YEARS)?;
    params.serial_number = Some(SerialNumber::from(Uuid::now_v7().as_bytes().to_vec()));
    params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign];
    params.use_authority_key_identifier_extension = true;

    Ok(params.self_signed(key_pair)?.pem())
}

pub fn generate(
    subject: &CaSubject,
    key_bits: usize,
    now: OffsetDateTime,
) -> Result<GeneratedCa, CaGenerationError> {
    let components = subject.components()?;
    let (key_pair, key_pem) = generate_key(key_bits)?;
    let certificate_pem = self_signed(&key_pair, subject, now)?;

    Ok(GeneratedCa {
        certificate_pem,
        key_pem,
        subject: components,
    })
}

/// Generates a CA and writes certificate and key to new files.
///
/// Fails with [`CaGenerationError::AlreadyExists`] before generating anything if either file exists.
/// Missing parent directories are created, the key file is only readable by its owner.
pub async fn generate_files(
    certificate_path: &Path,
    key_path: &Path,
    subject: &CaSubject,
    key_bits: usize,
    now: OffsetDateTime,
) -> Result<GeneratedCa, CaGenerationError> {
    for path in [certificate_path, key_path] {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| CaGenerationError::Write {
                path: path.to_owned(),
                source,
            })?;
        if exists {
            return Err(CaGenerationError::AlreadyExists(path.to_owned()));
        }
    }

    let generated = tokio::task::spawn_blocking({
        let subject = subject.clone();
        move || generate(&subject, key_bits, now)
    })
    .await
    .map_err(|err| CaGenerationError::Task(err.to_string()))??;

    write_new(key_path, generated.key_pem.expose_secret(), true).await?;
    write_new(certificate_path, &generated.certificate_pem, false).await?;

    tracing::info!(
        subject = %format_subject(&generated.subject),
        certificate = %certificate_path.display(),
        key = %key_path.display(),
        "Generated CA identity"
    );
    Ok(generated)
}

fn years_later(
    date: OffsetDateTime,
    years: i32,
) -> Result<OffsetDateTime, time::error::ComponentRange> {
    let year = date.year() + years;
    date.replace_year(year)
        // 29 February
        .or_else(|_| date.replace_day(28)?.replace_year(year))
}

async fn write_new(path: &Path, contents: &str, private: bool) -> Result<(), CaGenerationError> {
    let write_error = |source: std::io::Error| CaGenerationError::Write {
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(write_error)?;
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    if private {
        options.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = options.open(path).await.map_err(|err| match err.kind() {
        ErrorKind::AlreadyExists => CaGenerationError::AlreadyExists(path.to_owned()),
        _ => write_error(err),
    })?;
    file.write_all(contents.as_bytes())
        .await
        .map_err(write_error)?;
    file.flush().await.map_err(write_error)?;

    Ok(())
}
