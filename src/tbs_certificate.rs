use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;

use crate::cert::params::{CertificateName, ExtensionParam, Validity};
use crate::error::Result;
use crate::key::{KeyPair, PublicKey};
use crate::serial::SerialNumber;

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
/// This struct contains all the fields required to generate a valid X.509 certificate.
///
/// # Fields
/// * `serial_number` - Random per certificate, see [`SerialNumber`].
/// * `issuer` - The issuer name, written exactly as the issuing certificate carries it.
/// * `validity` - The certificate's validity period.
/// * `subject` - The name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `extensions` - X.509 extensions, written in order.
#[derive(Debug, Clone)]
pub struct TbsCertificate {
    pub serial_number: SerialNumber,
    pub issuer: CertificateName,
    pub validity: Validity,
    pub subject: CertificateName,
    pub subject_public_key: PublicKey,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    ///
    /// The signature algorithm is always sha256WithRSAEncryption.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(ExtensionParam::to_x509)
            .collect::<Result<Vec<_>>>()?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number: self.serial_number.to_x509()?,
            signature: KeyPair::signature_algorithm()?,
            issuer: self.issuer.as_x509().clone(),
            validity: self.validity.to_x509()?,
            subject: self.subject.as_x509().clone(),
            subject_public_key_info: self.subject_public_key.to_spki()?,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }
}
