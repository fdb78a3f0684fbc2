use der::{Decode, Encode};
use log::debug;
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::extensions::{AuthorityKeyIdentifier, ExtendedKeyUsage, KeyUsage, SubjectAltName};
use crate::cert::params::{CertificateName, CertificateProfile, ExtensionParam, Validity};
use crate::error::{PkiError, Result};
use crate::key::{KeyPair, PublicKey};
use crate::serial::SerialNumber;
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
///
/// Implementors only expose their name, key and start of validity; building,
/// signing and re-parsing the certificate is shared.
pub trait Issuer {
    /// The issuer name, copied verbatim into every certificate this issuer signs.
    fn issuer_name(&self) -> CertificateName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// The `notBefore` stamped on every certificate this issuer signs.
    fn not_before(&self) -> OffsetDateTime;

    /// Signs a leaf certificate for `subject_key` described by `profile`.
    ///
    /// # Errors
    /// * [`PkiError::InvalidProfile`] before any cryptographic work when the
    ///   profile lacks a common name or extended key usages.
    /// * [`PkiError::EncodingError`] when the SAN entries cannot be marshaled.
    /// * [`PkiError::SigningError`] for any other template or signature failure.
    fn sign(&self, profile: &CertificateProfile, subject_key: &PublicKey) -> Result<Certificate> {
        self.sign_at(profile, subject_key, OffsetDateTime::now_utc())
    }

    /// Same as [`Issuer::sign`], with `now` as the base for `notAfter`.
    fn sign_at(
        &self,
        profile: &CertificateProfile,
        subject_key: &PublicKey,
        now: OffsetDateTime,
    ) -> Result<Certificate> {
        profile.validate()?;

        let signing_error = |reason: String| PkiError::SigningError {
            subject: profile.common_name.clone(),
            reason,
        };

        let san = SubjectAltName::from(&profile.alt_names);
        let authority_key_id = AuthorityKeyIdentifier {
            key_identifier: self
                .signing_key()
                .public_key()
                .key_identifier()
                .map_err(|e| signing_error(e.to_string()))?,
        };
        let extended_key_usage = ExtendedKeyUsage {
            usage: profile.usages.clone(),
        };

        let extensions = vec![
            ExtensionParam::from_extension(&KeyUsage::leaf(), true)?,
            ExtensionParam::from_extension(&extended_key_usage, false)?,
            ExtensionParam::from_extension(&authority_key_id, false)?,
            ExtensionParam::from_extension(&san, false)?,
        ];

        let subject = CertificateName::try_from(&profile.subject())
            .map_err(|e| signing_error(e.to_string()))?;

        let not_before = self.not_before();
        let tbs = TbsCertificate {
            serial_number: SerialNumber::random(),
            issuer: self.issuer_name(),
            validity: Validity {
                not_before,
                not_after: Validity::starting_at(now, profile.validity).not_after,
            },
            subject,
            subject_public_key: subject_key.clone(),
            extensions,
        };

        debug!(
            "signing {} (serial {}) with SANs {:?}",
            tbs.subject, tbs.serial_number, san
        );
        self.sign_tbs(&tbs).map_err(|e| match e {
            PkiError::SigningError { .. } => e,
            other => signing_error(other.to_string()),
        })
    }

    /// Signs an already assembled template.
    ///
    /// The DER output is parsed back before returning, so callers always get a
    /// certificate that decodes.
    fn sign_tbs(&self, tbs: &TbsCertificate) -> Result<Certificate> {
        let tbs_cert_inner = tbs.to_tbs_certificate_inner()?;
        let signature = self.signing_key().sign_data(&tbs_cert_inner.to_der()?)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: KeyPair::signature_algorithm()?,
            signature: der::asn1::BitString::from_bytes(&signature)?,
        };

        let der = cert_inner.to_der()?;
        let inner = CertificateInner::from_der(&der).map_err(|source| PkiError::ParseError { source })?;
        Ok(Certificate { inner })
    }
}
