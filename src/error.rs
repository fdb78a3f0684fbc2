//! use espki::error::PkiError;

use thiserror::Error;

/// Represents errors that can occur while issuing or inspecting certificates.
///
/// Every variant carries enough context to tell which certificate or which
/// input was at fault. Nothing in this crate retries on error.
#[derive(Debug, Error, Clone)]
pub enum PkiError {
    /// A required field of a certificate profile is missing.
    #[error("invalid certificate profile {common_name:?}: must specify {field}")]
    InvalidProfile {
        common_name: String,
        field: &'static str,
    },

    /// Error during DER marshaling (SAN entries, names, validity).
    #[error("failed to encode data: {0}")]
    EncodingError(String),

    /// Error while building or signing a leaf certificate.
    #[error("failed to sign certificate for {subject:?}: {reason}")]
    SigningError { subject: String, reason: String },

    /// Error while generating the root CA key or self-signing its certificate.
    #[error("failed to generate CA certificate: {0}")]
    CaGenerationError(String),

    /// Error during key generation.
    #[error("key generation failed: {0}")]
    KeyGenerationError(String),

    /// No usable PEM block in the input.
    #[error("failed to decode PEM data: {0}")]
    DecodeError(String),

    /// The PEM block decoded, but its DER contents are not a valid certificate.
    #[error("failed to parse the certificate: {source}")]
    ParseError {
        #[source]
        source: der::Error,
    },

    /// A signature did not verify under the expected key.
    #[error("signature verification failed: {0}")]
    VerificationError(String),

    /// The keystore adapter rejected its inputs or failed to convert.
    #[error("keystore conversion failed: {0}")]
    KeystoreError(String),

    /// Configuration could not be read or parsed.
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PkiError>;

impl From<der::Error> for PkiError {
    /// Converts a `der::Error` into a `PkiError`.
    fn from(err: der::Error) -> Self {
        PkiError::EncodingError(err.to_string())
    }
}

impl From<toml::de::Error> for PkiError {
    fn from(err: toml::de::Error) -> Self {
        PkiError::ConfigError(err.to_string())
    }
}
