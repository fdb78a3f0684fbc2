//! Entry points for issuing and inspecting the PKI.

use log::info;

use crate::cert::params::{CertificateName, CertificateProfile, DistinguishedName};
use crate::cert::{CaIdentity, CaOptions, Certificate};
use crate::error::{PkiError, Result};
use crate::issuer::Issuer;
use crate::key::{KeyEncoding, KeyPair, PublicKey};
use crate::keystore::{KeystoreConverter, KeystoreRequest};
use crate::profiles::{OutputNames, ProfileCatalog, ProfileKind};

/// Creates the self-signed root CA with default key size and lifetime.
pub fn issue_ca(subject: &DistinguishedName) -> Result<CaIdentity> {
    CaIdentity::issue(subject)
}

/// Signs `subject_key` into a leaf certificate described by `profile`.
pub fn sign(
    profile: &CertificateProfile,
    subject_key: &PublicKey,
    ca: &CaIdentity,
) -> Result<Certificate> {
    ca.sign(profile, subject_key)
}

/// Returns the full subject name of the PEM-encoded certificate in `pem`.
pub fn extract_subject(pem: &[u8]) -> Result<CertificateName> {
    Ok(Certificate::from_pem(pem)?.subject())
}

/// A freshly generated key and the certificate issued for it, both as PEM.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub certificate: Certificate,
    pub key_pem: String,
    pub cert_pem: String,
}

/// Generates a key of `key_bits` and signs it according to `profile`.
pub fn generate_leaf(
    profile: &CertificateProfile,
    ca: &CaIdentity,
    key_bits: usize,
    encoding: KeyEncoding,
) -> Result<IssuedCertificate> {
    // Reject a bad profile before paying for key generation.
    profile.validate()?;

    let key = KeyPair::generate_rsa(key_bits).map_err(|e| PkiError::SigningError {
        subject: profile.common_name.clone(),
        reason: e.to_string(),
    })?;
    let certificate = ca.sign(profile, &key.public_key())?;

    Ok(IssuedCertificate {
        cert_pem: certificate.to_pem()?,
        key_pem: key.to_pem(encoding)?,
        certificate,
    })
}

/// Issues every leaf profile of `catalog` against `ca`.
pub fn issue_catalog(
    ca: &CaIdentity,
    catalog: &ProfileCatalog,
    key_bits: usize,
) -> Result<Vec<(ProfileKind, IssuedCertificate)>> {
    let mut issued = Vec::with_capacity(ProfileKind::LEAVES.len());
    for kind in ProfileKind::LEAVES {
        let Some(profile) = catalog.profile(kind) else {
            continue;
        };
        let leaf = generate_leaf(&profile, ca, key_bits, catalog.output(kind).key_encoding)?;
        info!(
            "issued {} certificate for {} (serial {})",
            kind.name(),
            profile.common_name,
            leaf.certificate.serial_number()?
        );
        issued.push((kind, leaf));
    }
    Ok(issued)
}

/// Issues the root CA and every leaf described by `catalog`.
pub fn issue_all(
    catalog: &ProfileCatalog,
    ca_options: &CaOptions,
    key_bits: usize,
) -> Result<(CaIdentity, Vec<(ProfileKind, IssuedCertificate)>)> {
    let ca = CaIdentity::issue_with(&catalog.ca_subject(), ca_options)?;
    let leaves = issue_catalog(&ca, catalog, key_bits)?;
    Ok((ca, leaves))
}

/// Hands an issued pair to a keystore converter.
///
/// Returns `None` for PEM-only outputs, which have no keystore alias.
pub fn export_keystore<C: KeystoreConverter + ?Sized>(
    converter: &C,
    ca: &CaIdentity,
    issued: &IssuedCertificate,
    names: &OutputNames,
    passphrase: &str,
) -> Result<Option<Vec<u8>>> {
    let Some(alias) = names.alias.as_deref() else {
        return Ok(None);
    };
    let ca_cert_pem = ca.cert_pem()?;
    let request = KeystoreRequest {
        cert_pem: &issued.cert_pem,
        key_pem: &issued.key_pem,
        ca_cert_pem: &ca_cert_pem,
        passphrase,
        alias,
    };
    converter.convert(&request).map(Some)
}
