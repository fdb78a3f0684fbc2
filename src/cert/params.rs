use std::fmt;
use std::net::IpAddr;

use bon::Builder;
use const_oid::ObjectIdentifier;
use der::Tagged;
use der::asn1::{GeneralizedTime, SetOfVec, UtcTime};
use time::{Duration, OffsetDateTime};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
pub use crate::cert::extensions::ExtendedKeyUsageOption;
use crate::error::{PkiError, Result};

/// id-at-commonName
pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// id-at-organizationName
pub const ORGANIZATION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");

/// Default lifetime of a leaf certificate.
pub const DEFAULT_LEAF_VALIDITY_DAYS: i64 = 365;

/// Subject or issuer name of a certificate.
///
/// Only the attributes the PKI actually sets are modelled: one common name and
/// any number of organizations. Names read back from certificates are
/// [`CertificateName`]s.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    #[builder(into)]
    pub common_name: String,
    #[builder(default)]
    pub organization: Vec<String>,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509 `Name`.
    ///
    /// Organizations come first and the common name last, so the RFC 4514
    /// string form reads `CN=...,O=...`.
    pub fn as_x509_name(&self) -> std::result::Result<x509_cert::name::Name, der::Error> {
        let mut rdns = Vec::with_capacity(self.organization.len() + 1);
        for org in &self.organization {
            rdns.push(single_attribute_rdn(ORGANIZATION, org)?);
        }
        if !self.common_name.is_empty() {
            rdns.push(single_attribute_rdn(COMMON_NAME, &self.common_name)?);
        }
        Ok(RdnSequence(rdns))
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CN={}", self.common_name)?;
        for org in &self.organization {
            write!(f, ",O={org}")?;
        }
        Ok(())
    }
}

fn single_attribute_rdn(
    oid: ObjectIdentifier,
    value: &str,
) -> std::result::Result<RelativeDistinguishedName, der::Error> {
    let atv = AttributeTypeAndValue {
        oid,
        value: der::Any::new(der::Tag::Utf8String, value.as_bytes())?,
    };
    Ok(RelativeDistinguishedName(SetOfVec::try_from(vec![atv])?))
}

/// A name exactly as it appears in a certificate.
///
/// The whole RDN sequence is kept, in its original order and string types, so
/// an issuer name can be copied verbatim into the certificates it signs and a
/// subject read from a foreign certificate loses no attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateName(pub x509_cert::name::Name);

impl CertificateName {
    pub fn as_x509(&self) -> &x509_cert::name::Name {
        &self.0
    }

    /// Every readable value of attribute `oid`, in sequence order.
    pub fn attribute_values(&self, oid: ObjectIdentifier) -> Vec<String> {
        self.0
            .0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .filter(|atv| atv.oid == oid)
            .filter_map(attribute_text)
            .collect()
    }

    /// The most specific common name, i.e. the last CN of the sequence.
    pub fn common_name(&self) -> Option<String> {
        self.attribute_values(COMMON_NAME).pop()
    }

    pub fn organization(&self) -> Vec<String> {
        self.attribute_values(ORGANIZATION)
    }
}

impl From<x509_cert::name::Name> for CertificateName {
    fn from(name: x509_cert::name::Name) -> Self {
        Self(name)
    }
}

impl TryFrom<&DistinguishedName> for CertificateName {
    type Error = PkiError;

    fn try_from(dn: &DistinguishedName) -> Result<Self> {
        Ok(Self(dn.as_x509_name()?))
    }
}

/// RFC 4514 string form, most specific attribute first.
impl fmt::Display for CertificateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// Decodes the directory string types found in real-world names.
fn attribute_text(attr: &AttributeTypeAndValue) -> Option<String> {
    let bytes = attr.value.value();
    match attr.value.tag() {
        der::Tag::Utf8String
        | der::Tag::PrintableString
        | der::Tag::Ia5String
        | der::Tag::TeletexString
        | der::Tag::VisibleString => String::from_utf8(bytes.to_vec()).ok(),
        der::Tag::BmpString if bytes.len() % 2 == 0 => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        _ => None,
    }
}

/// Alternative identities a leaf certificate is valid for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AltNames {
    pub dns_names: Vec<String>,
    pub emails: Vec<String>,
    pub ips: Vec<IpAddr>,
}

/// Describes a leaf certificate to be issued.
///
/// # Fields
/// * `common_name` - Subject CN, required.
/// * `organization` - Subject O values.
/// * `alt_names` - Entries for the SAN extension.
/// * `usages` - Extended key usages, at least one is required.
/// * `validity` - How long after signing the certificate stays valid.
#[derive(Clone, Debug, Builder)]
pub struct CertificateProfile {
    #[builder(into)]
    pub common_name: String,
    #[builder(default)]
    pub organization: Vec<String>,
    #[builder(default)]
    pub alt_names: AltNames,
    #[builder(default)]
    pub usages: Vec<ExtendedKeyUsageOption>,
    #[builder(default = Duration::days(DEFAULT_LEAF_VALIDITY_DAYS))]
    pub validity: Duration,
}

impl CertificateProfile {
    /// Checks the fields that must be present before any key material is touched.
    pub fn validate(&self) -> Result<()> {
        if self.common_name.is_empty() {
            return Err(PkiError::InvalidProfile {
                common_name: self.common_name.clone(),
                field: "common_name",
            });
        }
        if self.usages.is_empty() {
            return Err(PkiError::InvalidProfile {
                common_name: self.common_name.clone(),
                field: "extended_key_usages",
            });
        }
        Ok(())
    }

    pub fn subject(&self) -> DistinguishedName {
        DistinguishedName {
            common_name: self.common_name.clone(),
            organization: self.organization.clone(),
        }
    }
}

/// Certificate validity period, kept at whole-second precision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting at `not_before` and lasting `duration`.
    pub fn starting_at(not_before: OffsetDateTime, duration: Duration) -> Self {
        let not_before = truncate_to_seconds(not_before);
        Self {
            not_before,
            not_after: not_before + duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.not_after - self.not_before
    }

    pub fn to_x509(&self) -> Result<x509_cert::time::Validity> {
        Ok(x509_cert::time::Validity {
            not_before: to_x509_time(self.not_before)?,
            not_after: to_x509_time(self.not_after)?,
        })
    }

    pub fn from_x509(validity: &x509_cert::time::Validity) -> Result<Self> {
        Ok(Self {
            not_before: from_x509_time(&validity.not_before)?,
            not_after: from_x509_time(&validity.not_after)?,
        })
    }
}

fn truncate_to_seconds(t: OffsetDateTime) -> OffsetDateTime {
    t.replace_nanosecond(0).unwrap_or(t)
}

// RFC 5280 section 4.1.2.5: UTCTime through 2049, GeneralizedTime from 2050.
fn to_x509_time(t: OffsetDateTime) -> Result<x509_cert::time::Time> {
    let secs = u64::try_from(t.unix_timestamp())
        .map_err(|_| PkiError::EncodingError(format!("time {t} predates the unix epoch")))?;
    let date_time = der::DateTime::from_unix_duration(std::time::Duration::from_secs(secs))?;
    if date_time.year() < 2050 {
        Ok(x509_cert::time::Time::UtcTime(UtcTime::from_date_time(
            date_time,
        )?))
    } else {
        Ok(x509_cert::time::Time::GeneralTime(
            GeneralizedTime::from_date_time(date_time),
        ))
    }
}

fn from_x509_time(t: &x509_cert::time::Time) -> Result<OffsetDateTime> {
    let since_epoch = match t {
        x509_cert::time::Time::UtcTime(ut) => ut.to_unix_duration(),
        x509_cert::time::Time::GeneralTime(gt) => gt.to_unix_duration(),
    };
    let secs = i64::try_from(since_epoch.as_secs())
        .map_err(|_| PkiError::DecodeError("certificate time out of range".to_string()))?;
    OffsetDateTime::from_unix_timestamp(secs).map_err(|e| PkiError::DecodeError(e.to_string()))
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Encodes `extension` and wraps it with its OID and criticality.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: &E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }

    pub fn to_x509(&self) -> Result<x509_cert::ext::Extension> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: der::asn1::OctetString::new(self.value.clone())?,
        })
    }

    pub fn from_x509(ext: &x509_cert::ext::Extension) -> Self {
        Self {
            oid: ext.extn_id,
            critical: ext.critical,
            value: ext.extn_value.as_bytes().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> CertificateProfile {
        CertificateProfile::builder()
            .common_name("node.example")
            .usages(vec![ExtendedKeyUsageOption::ServerAuth])
            .build()
    }

    #[test]
    fn test_profile_defaults_to_one_year() {
        assert_eq!(sample_profile().validity, Duration::days(365));
        sample_profile().validate().unwrap();
    }

    #[test]
    fn test_profile_requires_common_name() {
        let mut profile = sample_profile();
        profile.common_name.clear();
        match profile.validate() {
            Err(PkiError::InvalidProfile { field, .. }) => assert_eq!(field, "common_name"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_profile_requires_usages() {
        let mut profile = sample_profile();
        profile.usages.clear();
        match profile.validate() {
            Err(PkiError::InvalidProfile { field, common_name }) => {
                assert_eq!(field, "extended_key_usages");
                assert_eq!(common_name, "node.example");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    fn single_rdn_name(atvs: Vec<AttributeTypeAndValue>) -> CertificateName {
        CertificateName(RdnSequence(
            atvs.into_iter()
                .map(|atv| RelativeDistinguishedName(SetOfVec::try_from(vec![atv]).unwrap()))
                .collect(),
        ))
    }

    fn atv(oid: ObjectIdentifier, tag: der::Tag, value: &[u8]) -> AttributeTypeAndValue {
        AttributeTypeAndValue {
            oid,
            value: der::Any::new(tag, value).unwrap(),
        }
    }

    #[test]
    fn test_distinguished_name_x509_conversion() {
        let dn = DistinguishedName::builder()
            .common_name("KubeDB Com. Root CA")
            .organization(vec!["Elasticsearch Operator".to_string()])
            .build();
        let name = CertificateName::try_from(&dn).unwrap();
        assert_eq!(name.as_x509().0.len(), 2);
        assert_eq!(name.common_name().as_deref(), Some("KubeDB Com. Root CA"));
        assert_eq!(name.organization(), vec!["Elasticsearch Operator"]);
        assert_eq!(dn.to_string(), "CN=KubeDB Com. Root CA,O=Elasticsearch Operator");
        assert_eq!(name.to_string(), dn.to_string());
    }

    #[test]
    fn test_certificate_name_keeps_every_attribute() {
        let country = ObjectIdentifier::new_unwrap("2.5.4.6");
        let unit = ObjectIdentifier::new_unwrap("2.5.4.11");
        let name = single_rdn_name(vec![
            atv(country, der::Tag::PrintableString, b"US"),
            atv(ORGANIZATION, der::Tag::Utf8String, b"Elasticsearch Operator"),
            atv(unit, der::Tag::Utf8String, b"Ops"),
            atv(COMMON_NAME, der::Tag::PrintableString, b"first"),
            atv(COMMON_NAME, der::Tag::Utf8String, b"Go Root"),
        ]);

        assert_eq!(name.attribute_values(country), vec!["US"]);
        assert_eq!(name.attribute_values(unit), vec!["Ops"]);
        assert_eq!(name.attribute_values(COMMON_NAME), vec!["first", "Go Root"]);
        assert_eq!(name.common_name().as_deref(), Some("Go Root"));
        assert_eq!(
            name.to_string(),
            "CN=Go Root,CN=first,OU=Ops,O=Elasticsearch Operator,C=US"
        );
    }

    #[test]
    fn test_bmp_string_attributes_are_read() {
        let utf16: Vec<u8> = "Zürich Root"
            .encode_utf16()
            .flat_map(u16::to_be_bytes)
            .collect();
        let name = single_rdn_name(vec![atv(COMMON_NAME, der::Tag::BmpString, &utf16)]);
        assert_eq!(name.common_name().as_deref(), Some("Zürich Root"));
    }

    #[test]
    fn test_validity_truncates_and_survives_encoding() {
        let start = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
            + Duration::milliseconds(750);
        let validity = Validity::starting_at(start, Duration::days(365));
        assert_eq!(validity.not_before.nanosecond(), 0);
        assert_eq!(validity.duration(), Duration::days(365));

        let decoded = Validity::from_x509(&validity.to_x509().unwrap()).unwrap();
        assert_eq!(decoded, validity);
    }

    #[test]
    fn test_late_dates_use_generalized_time() {
        let start = OffsetDateTime::from_unix_timestamp(2_600_000_000).unwrap();
        let validity = Validity::starting_at(start, Duration::days(1));
        let encoded = validity.to_x509().unwrap();
        assert!(matches!(
            encoded.not_before,
            x509_cert::time::Time::GeneralTime(_)
        ));
        assert_eq!(Validity::from_x509(&encoded).unwrap(), validity);
    }
}
