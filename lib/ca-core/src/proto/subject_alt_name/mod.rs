//! Canonical storage form and X.509 presentation form of subject alternative names.
//!
//! DNS names are stored decoded (Unicode, UTS-46 mapped) and rendered as Punycode.
//! IP addresses are stored compressed and rendered exploded.

use std::net::IpAddr;

use crate::model::subject_alt_name::SubjectAltNameKind;
use crate::service::error::ValidationError;

/// Longest accepted DNS name, in its ASCII encoded form
pub const MAX_DNS_NAME_LENGTH: usize = 64;
const MAX_DNS_LABEL_LENGTH: usize = 63;

pub fn normalize(kind: SubjectAltNameKind, raw: &str) -> Result<String, ValidationError> {
    match kind {
        SubjectAltNameKind::Dns => normalize_dns(raw),
        SubjectAltNameKind::Ip => normalize_ip(raw),
        SubjectAltNameKind::Email | SubjectAltNameKind::Uri => {
            Err(invalid(kind, raw, "kind not supported"))
        }
    }
}

pub fn render(kind: SubjectAltNameKind, canonical: &str) -> Result<String, ValidationError> {
    match kind {
        SubjectAltNameKind::Dns => to_ascii(canonical),
        SubjectAltNameKind::Ip => render_ip(canonical),
        SubjectAltNameKind::Email | SubjectAltNameKind::Uri => {
            Err(invalid(kind, canonical, "kind not supported"))
        }
    }
}

fn normalize_dns(raw: &str) -> Result<String, ValidationError> {
    let ascii = to_ascii(raw)?;

    let (unicode, result) = idna::domain_to_unicode(&ascii);
    result.map_err(|err| invalid(SubjectAltNameKind::Dns, raw, &err.to_string()))?;

    Ok(unicode)
}

fn to_ascii(raw: &str) -> Result<String, ValidationError> {
    let kind = SubjectAltNameKind::Dns;
    if raw.is_empty() {
        return Err(invalid(kind, raw, "empty name"));
    }

    let ascii =
        idna::domain_to_ascii_strict(raw).map_err(|err| invalid(kind, raw, &err.to_string()))?;

    if ascii.len() > MAX_DNS_NAME_LENGTH {
        return Err(invalid(
            kind,
            raw,
            &format!("encoded name longer than {MAX_DNS_NAME_LENGTH} characters"),
        ));
    }
    if ascii
        .split('.')
        .any(|label| label.len() > MAX_DNS_LABEL_LENGTH)
    {
        return Err(invalid(
            kind,
            raw,
            &format!("label longer than {MAX_DNS_LABEL_LENGTH} characters"),
        ));
    }

    Ok(ascii)
}

fn normalize_ip(raw: &str) -> Result<String, ValidationError> {
    let address = parse_ip(raw)?;
    if address.is_multicast() {
        return Err(invalid(SubjectAltNameKind::Ip, raw, "multicast address"));
    }

    Ok(address.to_string())
}

fn render_ip(canonical: &str) -> Result<String, ValidationError> {
    Ok(match parse_ip(canonical)? {
        IpAddr::V4(address) => address.to_string(),
        IpAddr::V6(address) => address
            .segments()
            .iter()
            .map(|segment| format!("{segment:04x}"))
            .collect::<Vec<_>>()
            .join(":"),
    })
}

fn parse_ip(raw: &str) -> Result<IpAddr, ValidationError> {
    raw.parse()
        .map_err(|err: std::net::AddrParseError| {
            invalid(SubjectAltNameKind::Ip, raw, &err.to_string())
        })
}

fn invalid(kind: SubjectAltNameKind, value: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidSubjectAltName {
        kind,
        value: value.to_owned(),
        reason: reason.to_owned(),
    }
}
