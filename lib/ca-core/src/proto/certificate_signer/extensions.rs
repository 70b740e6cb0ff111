use std::net::IpAddr;

use rcgen::CustomExtension;
use yasna::Tag;
use yasna::models::ObjectIdentifier;

use crate::proto::signing_cert::SigningCert;

const OID_SUBJECT_KEY_IDENTIFIER: &[u64] = &[2, 5, 29, 14];
const OID_SUBJECT_ALT_NAME: &[u64] = &[2, 5, 29, 17];
const OID_BASIC_CONSTRAINTS: &[u64] = &[2, 5, 29, 19];
const OID_EXTENDED_KEY_USAGE: &[u64] = &[2, 5, 29, 37];
const OID_AUTHORITY_KEY_IDENTIFIER: &[u64] = &[2, 5, 29, 35];
const OID_KP_CLIENT_AUTH: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 2];
const OID_KP_SERVER_AUTH: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 1];

/// An entry of `subjectAltName`, in rendered form
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) enum GeneralName {
    Dns(String),
    Ip(IpAddr),
}

/// Critical `basicConstraints = CA:FALSE`
pub(super) fn basic_constraints() -> CustomExtension {
    // cA defaults to FALSE, so the sequence stays empty
    let content = yasna::construct_der(|writer| writer.write_sequence(|_| {}));

    let mut extension = CustomExtension::from_oid_content(OID_BASIC_CONSTRAINTS, content);
    extension.set_criticality(true);
    extension
}

/// Non-critical `subjectAltName`, `None` without names
pub(super) fn subject_alt_name(names: &[GeneralName]) -> Option<CustomExtension> {
    if names.is_empty() {
        return None;
    }

    let content = yasna::construct_der(|writer| {
        writer.write_sequence(|writer| {
            for name in names {
                match name {
                    GeneralName::Dns(dns_name) => writer
                        .next()
                        .write_tagged_implicit(Tag::context(2), |writer| {
                            writer.write_ia5_string(dns_name)
                        }),
                    GeneralName::Ip(IpAddr::V4(address)) => writer
                        .next()
                        .write_tagged_implicit(Tag::context(7), |writer| {
                            writer.write_bytes(&address.octets())
                        }),
                    GeneralName::Ip(IpAddr::V6(address)) => writer
                        .next()
                        .write_tagged_implicit(Tag::context(7), |writer| {
                            writer.write_bytes(&address.octets())
                        }),
                }
            }
        })
    });

    Some(CustomExtension::from_oid_content(
        OID_SUBJECT_ALT_NAME,
        content,
    ))
}

/// Non-critical `subjectKeyIdentifier`
pub(super) fn subject_key_identifier(key_identifier: &[u8]) -> CustomExtension {
    let content = yasna::construct_der(|writer| writer.write_bytes(key_identifier));

    CustomExtension::from_oid_content(OID_SUBJECT_KEY_IDENTIFIER, content)
}

/// Critical `extendedKeyUsage = clientAuth, serverAuth`
pub(super) fn extended_key_usage() -> CustomExtension {
    let content = yasna::construct_der(|writer| {
        writer.write_sequence(|writer| {
            for usage in [OID_KP_CLIENT_AUTH, OID_KP_SERVER_AUTH] {
                writer.next().write_oid(&ObjectIdentifier::from_slice(usage));
            }
        })
    });

    let mut extension = CustomExtension::from_oid_content(OID_EXTENDED_KEY_USAGE, content);
    extension.set_criticality(true);
    extension
}

/// `authorityKeyIdentifier` with key id, issuer name and serial of the CA certificate
pub(super) fn authority_key_identifier(signing_cert: &SigningCert) -> CustomExtension {
    let content = yasna::construct_der(|writer| {
        writer.write_sequence(|writer| {
            writer
                .next()
                .write_tagged_implicit(Tag::context(0), |writer| {
                    writer.write_bytes(signing_cert.key_identifier())
                });
            writer
                .next()
                .write_tagged_implicit(Tag::context(1), |writer| {
                    writer.write_sequence(|writer| {
                        // directoryName, explicit since Name is a CHOICE
                        writer.next().write_tagged(Tag::context(4), |writer| {
                            writer.write_der(signing_cert.issuer_name_der())
                        });
                    })
                });
            writer
                .next()
                .write_tagged_implicit(Tag::context(2), |writer| {
                    writer.write_bigint_bytes(signing_cert.serial(), true)
                });
        })
    });

    CustomExtension::from_oid_content(OID_AUTHORITY_KEY_IDENTIFIER, content)
}
