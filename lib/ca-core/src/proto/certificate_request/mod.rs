//! PKCS#10 request parsing and validation.
//!
//! A request is accepted only when its self-signature verifies and the submitted
//! bytes are exactly the canonical PEM encoding of the parsed structure, so the
//! stored fingerprint always identifies one well-formed request.

use std::fmt;

use pem::{EncodeConfig, LineEnding, Pem};
use rcgen::{DistinguishedName, DnType, DnValue};
use shared_types::CsrId;
use time::OffsetDateTime;
use x509_parser::oid_registry::{
    Oid, OID_X509_COMMON_NAME, OID_X509_COUNTRY_NAME, OID_X509_LOCALITY_NAME,
    OID_X509_ORGANIZATIONAL_UNIT, OID_X509_ORGANIZATION_NAME, OID_X509_STATE_OR_PROVINCE_NAME,
};
use x509_parser::der_parser::asn1_rs::Tag;
use x509_parser::prelude::{FromDer, X509CertificationRequest, X509Name};
use x509_parser::public_key::PublicKey;
use x509_parser::x509::SubjectPublicKeyInfo;

use crate::model::csr::Csr;
use crate::model::subject_alt_name::{SubjectAltName, SubjectAltNameKind};
use crate::proto::subject_alt_name;
use crate::service::error::ValidationError;
use crate::util::x509::public_key_identifier;

pub const PEM_TAG: &str = "CERTIFICATE REQUEST";

/// One subject attribute, `attribute` is the short name (`CN`, `OU`, ...) or the dotted OID
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubjectComponent {
    pub attribute: String,
    pub value: String,
}

impl SubjectComponent {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for SubjectComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

pub fn format_subject(components: &[SubjectComponent]) -> String {
    components
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PublicKeyAlgorithm {
    Rsa { bits: usize },
    Ec,
    Other,
}

/// A validated signing request
#[derive(Clone, Debug)]
pub struct CertificateRequest {
    der: Vec<u8>,
    subject: Vec<SubjectComponent>,
    distinguished_name: DistinguishedName,
    orgunit: String,
    commonname: String,
    public_key: PublicKeyAlgorithm,
    public_key_info: Vec<u8>,
    key_identifier: Vec<u8>,
    dns_name: String,
}

impl CertificateRequest {
    pub fn parse(pem_bytes: &[u8]) -> Result<Self, ValidationError> {
        let block = pem::parse(pem_bytes).map_err(|err| invalid(format!("bad PEM: {err}")))?;
        if block.tag() != PEM_TAG {
            return Err(invalid(format!("unexpected PEM tag `{}`", block.tag())));
        }
        let der = block.into_contents();

        let (subject, distinguished_name, public_key, public_key_info, key_identifier) = {
            let (rest, request) = X509CertificationRequest::from_der(&der)
                .map_err(|err| invalid(format!("bad PKCS#10 structure: {err}")))?;
            if !rest.is_empty() {
                return Err(invalid("trailing data after PKCS#10 structure"));
            }

            request
                .verify_signature()
                .map_err(|err| invalid(format!("signature verification failed: {err}")))?;

            let info = &request.certification_request_info;
            (
                subject_components(&info.subject)?,
                distinguished_name(&info.subject)?,
                public_key_algorithm(&info.subject_pki),
                info.subject_pki.raw.to_vec(),
                public_key_identifier(info.subject_pki.subject_public_key.data.as_ref()),
            )
        };

        if encode_pem(&der).as_bytes() != pem_bytes {
            return Err(invalid("PEM is not in canonical form"));
        }

        let attribute_value = |name: &str| {
            subject
                .iter()
                .find(|component| component.attribute == name)
                .map(|component| component.value.to_owned())
                .unwrap_or_default()
        };
        let orgunit = attribute_value("OU");
        let commonname = attribute_value("CN");

        let dns_name = subject_alt_name::normalize(SubjectAltNameKind::Dns, &commonname)
            .map_err(|err| invalid(format!("common name: {err}")))?;

        Ok(Self {
            der,
            subject,
            distinguished_name,
            orgunit,
            commonname,
            public_key,
            public_key_info,
            key_identifier,
            dns_name,
        })
    }

    /// New CSR record, unsigned and not rejected, with the common name as its DNS name
    pub fn to_csr(
        &self,
        sha256sum: String,
        created_date: OffsetDateTime,
    ) -> Result<Csr, ValidationError> {
        let id = CsrId::new_random();
        let dns_name = SubjectAltName::new(id, SubjectAltNameKind::Dns, &self.dns_name)?;

        Ok(Csr {
            id,
            created_date,
            sha256sum,
            pem: self.to_pem().into_bytes(),
            orgunit: self.orgunit.to_owned(),
            commonname: self.commonname.to_owned(),
            rejected: false,
            subject_alt_names: Some(vec![dns_name]),
            certificates: Some(vec![]),
        })
    }

    pub fn to_pem(&self) -> String {
        encode_pem(&self.der)
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn subject(&self) -> &[SubjectComponent] {
        &self.subject
    }

    pub fn orgunit(&self) -> &str {
        &self.orgunit
    }

    pub fn commonname(&self) -> &str {
        &self.commonname
    }

    pub fn public_key(&self) -> PublicKeyAlgorithm {
        self.public_key
    }

    /// DER encoded `SubjectPublicKeyInfo`
    pub fn public_key_info(&self) -> &[u8] {
        &self.public_key_info
    }

    /// Key identifier of the requested public key
    pub fn key_identifier(&self) -> &[u8] {
        &self.key_identifier
    }

    /// The subject as issued certificates carry it
    pub(crate) fn distinguished_name(&self) -> &DistinguishedName {
        &self.distinguished_name
    }

    /// Subject starts with all of `prefix`, in order
    pub fn subject_starts_with(&self, prefix: &[SubjectComponent]) -> bool {
        self.subject.starts_with(prefix)
    }
}

fn encode_pem(der: &[u8]) -> String {
    pem::encode_config(
        &Pem::new(PEM_TAG, der.to_vec()),
        EncodeConfig::new().set_line_ending(LineEnding::LF),
    )
}

fn subject_components(name: &X509Name) -> Result<Vec<SubjectComponent>, ValidationError> {
    name.iter_rdn()
        .flat_map(|rdn| rdn.iter())
        .map(|attribute| {
            let short_name = attribute_short_name(attribute.attr_type());
            let value = attribute
                .as_str()
                .map_err(|err| invalid(format!("subject attribute {short_name}: {err}")))?;

            Ok(SubjectComponent::new(short_name, value))
        })
        .collect()
}

/// Subject in issuable form. Every attribute type may appear once and the string types
/// of the request are kept.
fn distinguished_name(name: &X509Name) -> Result<DistinguishedName, ValidationError> {
    let mut distinguished_name = DistinguishedName::new();
    let mut seen = Vec::new();

    for attribute in name.iter_rdn().flat_map(|rdn| rdn.iter()) {
        let short_name = attribute_short_name(attribute.attr_type());
        let oid = attribute
            .attr_type()
            .iter()
            .ok_or_else(|| invalid(format!("subject attribute {short_name}: bad OID")))?
            .collect::<Vec<_>>();
        if seen.contains(&oid) {
            return Err(invalid(format!("repeated subject attribute {short_name}")));
        }

        let value = attribute
            .as_str()
            .map_err(|err| invalid(format!("subject attribute {short_name}: {err}")))?;
        let not_encodable =
            |err: rcgen::Error| invalid(format!("subject attribute {short_name}: {err}"));
        let value = match attribute.attr_value().header.tag() {
            Tag::PrintableString | Tag::NumericString => {
                DnValue::PrintableString(value.try_into().map_err(not_encodable)?)
            }
            Tag::Ia5String => DnValue::Ia5String(value.try_into().map_err(not_encodable)?),
            _ => DnValue::Utf8String(value.to_owned()),
        };

        distinguished_name.push(DnType::from_oid(&oid), value);
        seen.push(oid);
    }

    Ok(distinguished_name)
}

/// `CN`, `OU`, ... for the usual subject attributes, the dotted OID otherwise
pub(crate) fn attribute_short_name(oid: &Oid) -> String {
    [
        (&OID_X509_COUNTRY_NAME, "C"),
        (&OID_X509_STATE_OR_PROVINCE_NAME, "ST"),
        (&OID_X509_LOCALITY_NAME, "L"),
        (&OID_X509_ORGANIZATION_NAME, "O"),
        (&OID_X509_ORGANIZATIONAL_UNIT, "OU"),
        (&OID_X509_COMMON_NAME, "CN"),
    ]
    .into_iter()
    .find(|(known, _)| *known == oid)
    .map(|(_, short_name)| short_name.to_owned())
    .unwrap_or_else(|| oid.to_id_string())
}

fn public_key_algorithm(spki: &SubjectPublicKeyInfo) -> PublicKeyAlgorithm {
    match spki.parsed() {
        Ok(PublicKey::RSA(rsa)) => PublicKeyAlgorithm::Rsa {
            bits: rsa.key_size(),
        },
        Ok(PublicKey::EC(_)) => PublicKeyAlgorithm::Ec,
        _ => PublicKeyAlgorithm::Other,
    }
}

fn invalid(message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidCsr(message.into())
}
