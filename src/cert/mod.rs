pub mod extensions;
pub mod params;

use bon::Builder;
use const_oid::ObjectIdentifier;
use der::{Decode, Encode};
use extensions::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAltName, SubjectKeyIdentifier,
    ToAndFromX509Extension,
};
use log::info;
use params::{CertificateName, DistinguishedName, ExtensionParam, Validity};
use time::{Duration, OffsetDateTime};
use x509_cert::certificate::CertificateInner;

use crate::error::{PkiError, Result};
use crate::issuer::Issuer;
use crate::key::{DEFAULT_RSA_BITS, KeyEncoding, KeyPair, PublicKey};
use crate::pem_utils::{CERTIFICATE_LABEL, der_to_pem, pem_to_der};
use crate::serial::SerialNumber;
use crate::tbs_certificate::TbsCertificate;

/// Default lifetime of the root CA certificate.
pub const DEFAULT_CA_VALIDITY_DAYS: i64 = 3650;

/// Represents an X.509 certificate.
///
/// Certificates handed out by this crate have always been through a full
/// DER encode/decode cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Parses a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der).map_err(|source| PkiError::ParseError { source })?;
        Ok(Self { inner })
    }

    /// Parses the single `CERTIFICATE` block of a PEM document.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        Self::from_der(&pem_to_der(pem, CERTIFICATE_LABEL)?)
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| PkiError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        Ok(der_to_pem(&self.to_der()?, CERTIFICATE_LABEL))
    }

    /// The subject name with every attribute it was issued with.
    pub fn subject(&self) -> CertificateName {
        CertificateName(self.inner.tbs_certificate.subject.clone())
    }

    pub fn issuer(&self) -> CertificateName {
        CertificateName(self.inner.tbs_certificate.issuer.clone())
    }

    pub fn serial_number(&self) -> Result<SerialNumber> {
        SerialNumber::from_x509(&self.inner.tbs_certificate.serial_number)
    }

    pub fn validity(&self) -> Result<Validity> {
        Validity::from_x509(&self.inner.tbs_certificate.validity)
    }

    /// The public key the certificate binds to its subject.
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.tbs_certificate.subject_public_key_info)
    }

    /// Looks up a raw extension by OID.
    pub fn extension(&self, oid: ObjectIdentifier) -> Option<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .as_ref()?
            .iter()
            .find(|ext| ext.extn_id == oid)
            .map(ExtensionParam::from_x509)
    }

    /// Decodes the extension `E`, if the certificate carries it.
    pub fn extension_as<E: ToAndFromX509Extension>(&self) -> Result<Option<E>> {
        self.extension(E::OID)
            .map(|ext| ext.to_extension::<E>())
            .transpose()
    }

    pub fn subject_alt_name(&self) -> Result<Option<SubjectAltName>> {
        self.extension_as::<SubjectAltName>()
    }

    pub fn extended_key_usage(&self) -> Result<Option<ExtendedKeyUsage>> {
        self.extension_as::<ExtendedKeyUsage>()
    }

    /// Checks that `issuer_key` produced this certificate's signature.
    pub fn verify_signature(&self, issuer_key: &PublicKey) -> Result<()> {
        if self.inner.signature_algorithm.oid != const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION {
            return Err(PkiError::VerificationError(format!(
                "unsupported signature algorithm {}",
                self.inner.signature_algorithm.oid
            )));
        }
        let tbs_der = self.inner.tbs_certificate.to_der()?;
        let signature = self.inner.signature.as_bytes().ok_or_else(|| {
            PkiError::VerificationError("signature has unused bits".to_string())
        })?;
        issuer_key.verify(&tbs_der, signature)
    }
}

/// Options for generating the root CA.
#[derive(Clone, Debug, Builder)]
pub struct CaOptions {
    #[builder(default = DEFAULT_RSA_BITS)]
    pub key_bits: usize,
    #[builder(default = Duration::days(DEFAULT_CA_VALIDITY_DAYS))]
    pub validity: Duration,
}

impl Default for CaOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The root CA: its key pair and self-signed certificate.
///
/// Created once and never mutated; share it by reference to sign leaves,
/// from as many threads as needed.
#[derive(Debug, Clone)]
pub struct CaIdentity {
    cert: Certificate,
    key: KeyPair,
    subject: CertificateName,
    not_before: OffsetDateTime,
}

impl CaIdentity {
    /// Generates a fresh key and self-signed CA certificate with default options.
    pub fn issue(subject: &DistinguishedName) -> Result<Self> {
        Self::issue_with(subject, &CaOptions::default())
    }

    /// Generates a fresh key and self-signed CA certificate.
    ///
    /// # Errors
    /// Any failure surfaces as [`PkiError::CaGenerationError`].
    pub fn issue_with(subject: &DistinguishedName, options: &CaOptions) -> Result<Self> {
        let ca_error = |e: PkiError| PkiError::CaGenerationError(e.to_string());

        let key = KeyPair::generate_rsa(options.key_bits).map_err(ca_error)?;
        let public_key = key.public_key();
        let key_id = public_key.key_identifier().map_err(ca_error)?;
        let name = CertificateName::try_from(subject).map_err(ca_error)?;

        let basic_constraints = BasicConstraints {
            is_ca: true,
            max_path_length: None,
        };
        let extensions = vec![
            ExtensionParam::from_extension(&KeyUsage::authority(), true).map_err(ca_error)?,
            ExtensionParam::from_extension(&basic_constraints, true).map_err(ca_error)?,
            ExtensionParam::from_extension(&SubjectKeyIdentifier(key_id), false).map_err(ca_error)?,
        ];

        // For self-signed certificates, the issuer is the same as the subject
        let self_issuer = SelfIssuer {
            name: name.clone(),
            key: &key,
        };
        let validity = Validity::starting_at(self_issuer.not_before(), options.validity);

        let tbs = TbsCertificate {
            serial_number: SerialNumber::random(),
            issuer: name.clone(),
            validity,
            subject: name,
            subject_public_key: public_key,
            extensions,
        };
        let cert = self_issuer.sign_tbs(&tbs).map_err(ca_error)?;
        let identity = Self::from_parts(cert, key).map_err(ca_error)?;

        info!(
            "issued CA certificate {} (serial {})",
            identity.subject, tbs.serial_number
        );
        Ok(identity)
    }

    /// Rebuilds an identity from a previously issued certificate and its key.
    pub fn from_parts(cert: Certificate, key: KeyPair) -> Result<Self> {
        if cert.public_key()? != key.public_key() {
            return Err(PkiError::VerificationError(
                "CA certificate does not belong to the given key".to_string(),
            ));
        }
        let subject = cert.subject();
        let not_before = cert.validity()?.not_before;
        Ok(Self {
            cert,
            key,
            subject,
            not_before,
        })
    }

    /// Loads an identity from PEM-encoded certificate and private key.
    pub fn from_pem(cert_pem: &[u8], key_pem: &str) -> Result<Self> {
        Self::from_parts(Certificate::from_pem(cert_pem)?, KeyPair::from_pem(key_pem)?)
    }

    pub fn certificate(&self) -> &Certificate {
        &self.cert
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key
    }

    /// The CA's subject exactly as its certificate encodes it.
    pub fn subject(&self) -> &CertificateName {
        &self.subject
    }

    pub fn cert_pem(&self) -> Result<String> {
        self.cert.to_pem()
    }

    pub fn key_pem(&self, encoding: KeyEncoding) -> Result<String> {
        self.key.to_pem(encoding)
    }
}

impl Issuer for CaIdentity {
    fn issuer_name(&self) -> CertificateName {
        // The name of the issuer is the subject of the certificate
        self.subject.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        &self.key
    }

    fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: CertificateName,
    key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> CertificateName {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }

    fn not_before(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
