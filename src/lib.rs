//! # espki - internal PKI for Elasticsearch clusters
//!
//! espki issues the certificates an Elasticsearch deployment secured by
//! Search Guard needs: a self-signed RSA root CA and node, admin, sgadmin and
//! client certificates signed by it. It is built on the RustCrypto crates;
//! there is no dependency on OpenSSL outside of tests.
//!
//! Every leaf certificate carries a Subject Alternative Name extension that
//! ends with the `registeredID` 1.2.3.4.5.5. Search Guard uses that entry to
//! recognise node certificates.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use espki::{
//!     cert::params::{AltNames, CertificateProfile, DistinguishedName, ExtendedKeyUsageOption},
//!     key::KeyPair,
//!     pki,
//! };
//!
//! # fn main() -> Result<(), espki::error::PkiError> {
//! let ca = pki::issue_ca(
//!     &DistinguishedName::builder()
//!         .common_name("KubeDB Com. Root CA")
//!         .organization(vec!["Elasticsearch Operator".to_string()])
//!         .build(),
//! )?;
//!
//! let profile = CertificateProfile::builder()
//!     .common_name("node.example")
//!     .alt_names(AltNames {
//!         dns_names: vec!["node.example".to_string(), "localhost".to_string()],
//!         ..Default::default()
//!     })
//!     .usages(vec![ExtendedKeyUsageOption::ServerAuth, ExtendedKeyUsageOption::ClientAuth])
//!     .build();
//!
//! let node_key = KeyPair::generate_rsa(2048)?;
//! let node_cert = pki::sign(&profile, &node_key.public_key(), &ca)?;
//!
//! let subject = pki::extract_subject(node_cert.to_pem()?.as_bytes())?;
//! assert_eq!(subject.common_name().as_deref(), Some("node.example"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Issuing a whole deployment
//!
//! ```rust,no_run
//! use espki::{config::PkiConfig, pki};
//!
//! # fn main() -> Result<(), espki::error::PkiError> {
//! let config = PkiConfig::from_toml_str("[catalog]\ncluster_name = \"quick-es\"")?;
//! let (ca, leaves) = pki::issue_all(&config.catalog(), &config.ca_options(), config.key_bits)?;
//! for (kind, leaf) in &leaves {
//!     println!("{}: {}", kind.name(), leaf.certificate.subject());
//! }
//! # let _ = ca;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`pki`]: issue the CA, sign leaves, extract subjects
//! - [`cert`]: certificates, the CA identity and X.509 extensions
//! - [`issuer`]: the signing logic shared by the CA and self-signing
//! - [`key`]: RSA key generation, PEM import/export, signatures
//! - [`profiles`]: the node/admin/sgadmin/client catalog
//! - [`keystore`]: interface to PKCS#12 / JKS converters
//! - [`config`]: TOML configuration
//! - [`error`]: error types

pub mod cert;
pub mod config;
pub mod error;
pub mod issuer;
pub mod key;
pub mod keystore;
pub mod pem_utils;
pub mod pki;
pub mod profiles;
pub mod serial;
pub mod tbs_certificate;
