use std::path::Path;

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::cert::CaOptions;
use crate::cert::DEFAULT_CA_VALIDITY_DAYS;
use crate::cert::params::DEFAULT_LEAF_VALIDITY_DAYS;
use crate::error::{PkiError, Result};
use crate::key::DEFAULT_RSA_BITS;
use crate::profiles::{CatalogConfig, ProfileCatalog};

/// Smallest RSA modulus the configuration accepts.
pub const MIN_RSA_BITS: usize = 1024;

/// Top‑level PKI configuration; every field has a default.
///
/// ```toml
/// key_bits = 2048
/// ca_validity_days = 3650
/// leaf_validity_days = 365
///
/// [catalog]
/// cluster_name = "quick-es"
/// namespace = "demo"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PkiConfig {
    pub key_bits: usize,
    pub ca_validity_days: i64,
    pub leaf_validity_days: i64,
    pub catalog: CatalogConfig,
}

impl Default for PkiConfig {
    fn default() -> Self {
        Self {
            key_bits: DEFAULT_RSA_BITS,
            ca_validity_days: DEFAULT_CA_VALIDITY_DAYS,
            leaf_validity_days: DEFAULT_LEAF_VALIDITY_DAYS,
            catalog: CatalogConfig::default(),
        }
    }
}

impl PkiConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| PkiError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> Result<()> {
        if self.key_bits < MIN_RSA_BITS {
            return Err(PkiError::ConfigError(format!(
                "key_bits must be at least {MIN_RSA_BITS}, got {}",
                self.key_bits
            )));
        }
        if self.ca_validity_days <= 0 || self.leaf_validity_days <= 0 {
            return Err(PkiError::ConfigError(
                "validity periods must be positive".to_string(),
            ));
        }
        if self.catalog.cluster_name.is_empty() {
            return Err(PkiError::ConfigError(
                "catalog.cluster_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn ca_options(&self) -> CaOptions {
        CaOptions::builder()
            .key_bits(self.key_bits)
            .validity(Duration::days(self.ca_validity_days))
            .build()
    }

    pub fn catalog(&self) -> ProfileCatalog {
        ProfileCatalog::new(self.catalog.clone())
            .with_leaf_validity(Duration::days(self.leaf_validity_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::ProfileKind;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = PkiConfig::from_toml_str("").unwrap();
        assert_eq!(config, PkiConfig::default());
        assert_eq!(config.key_bits, 2048);
        assert_eq!(config.catalog.root.cert_file, "root-ca.pem");
    }

    #[test]
    fn test_partial_overrides() {
        let config = PkiConfig::from_toml_str(
            r#"
            leaf_validity_days = 90

            [catalog]
            cluster_name = "quick-es"
            namespace = "demo"

            [catalog.admin]
            key_file = "es-admin-key.pem"
            cert_file = "es-admin.pem"
            key_encoding = "pkcs8"
            "#,
        )
        .unwrap();

        assert_eq!(config.ca_validity_days, 3650);
        let catalog = config.catalog();
        assert_eq!(catalog.service_dns_name(), "quick-es.demo.svc");
        assert_eq!(
            catalog.profile(ProfileKind::Node).unwrap().validity,
            Duration::days(90)
        );
        assert_eq!(catalog.output(ProfileKind::Admin).key_file, "es-admin-key.pem");
        assert_eq!(catalog.output(ProfileKind::Client).cert_file, "client.pem");
    }

    #[test]
    fn test_rejects_weak_keys() {
        assert!(matches!(
            PkiConfig::from_toml_str("key_bits = 512"),
            Err(PkiError::ConfigError(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            PkiConfig::from_toml_str("key_bits = \"lots\""),
            Err(PkiError::ConfigError(_))
        ));
    }

    #[test]
    fn test_ca_options() {
        let options = PkiConfig::default().ca_options();
        assert_eq!(options.key_bits, 2048);
        assert_eq!(options.validity, Duration::days(3650));
    }
}
