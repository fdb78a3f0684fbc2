//! Boundary to whatever turns PEM material into PKCS#12 / JKS keystores.
//!
//! The crate never spawns `openssl` or `keytool` itself; deployments plug in
//! a [`KeystoreConverter`] that does.

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::error::{PkiError, Result};

/// Length of generated keystore passphrases.
pub const DEFAULT_PASSPHRASE_LEN: usize = 6;

/// Everything a converter needs to build one keystore entry.
#[derive(Debug, Clone, Copy)]
pub struct KeystoreRequest<'a> {
    pub cert_pem: &'a str,
    pub key_pem: &'a str,
    /// Root certificate added to the chain of the entry.
    pub ca_cert_pem: &'a str,
    pub passphrase: &'a str,
    pub alias: &'a str,
}

impl KeystoreRequest<'_> {
    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("certificate", self.cert_pem),
            ("private key", self.key_pem),
            ("CA certificate", self.ca_cert_pem),
            ("passphrase", self.passphrase),
            ("alias", self.alias),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        match missing {
            Some((field, _)) => Err(PkiError::KeystoreError(format!(
                "{field} must not be empty (alias {:?})",
                self.alias
            ))),
            None => Ok(()),
        }
    }
}

/// Converts a PEM certificate/key pair into keystore bytes.
pub trait KeystoreConverter {
    /// Produces the keystore; inputs have already been validated.
    fn convert_to_keystore(&self, request: &KeystoreRequest<'_>) -> Result<Vec<u8>>;

    /// Validates `request`, then converts it.
    fn convert(&self, request: &KeystoreRequest<'_>) -> Result<Vec<u8>> {
        request.validate()?;
        self.convert_to_keystore(request)
    }
}

/// A random alphanumeric passphrase from the thread-local CSPRNG.
pub fn generate_passphrase(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
