//! The fixed set of certificates an Elasticsearch deployment needs.
//!
//! Names, aliases and file names live in [`CatalogConfig`] rather than in
//! global constants, so one process can issue for several clusters.

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::cert::extensions::ExtendedKeyUsageOption;
use crate::cert::params::{
    AltNames, CertificateProfile, DEFAULT_LEAF_VALIDITY_DAYS, DistinguishedName,
};
use crate::key::KeyEncoding;

/// Organization written into every subject.
pub const DEFAULT_ORGANIZATION: &str = "Elasticsearch Operator";
/// Common name of the root CA.
pub const DEFAULT_ROOT_COMMON_NAME: &str = "KubeDB Com. Root CA";
/// Common name of the Search Guard admin tool certificate.
pub const SGADMIN_COMMON_NAME: &str = "sgadmin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Root,
    Node,
    Admin,
    SgAdmin,
    Client,
}

impl ProfileKind {
    /// Every profile signed by the root, in issuance order.
    pub const LEAVES: [ProfileKind; 4] = [
        ProfileKind::Node,
        ProfileKind::Admin,
        ProfileKind::SgAdmin,
        ProfileKind::Client,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProfileKind::Root => "root",
            ProfileKind::Node => "node",
            ProfileKind::Admin => "admin",
            ProfileKind::SgAdmin => "sgadmin",
            ProfileKind::Client => "client",
        }
    }
}

/// Where one profile's artifacts go and how they are labelled.
///
/// Profiles without `alias` stay PEM-only and never reach a keystore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNames {
    pub key_file: String,
    pub cert_file: String,
    #[serde(default)]
    pub pkcs12_file: Option<String>,
    #[serde(default)]
    pub keystore_file: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub key_encoding: KeyEncoding,
}

impl OutputNames {
    fn pem_only(key_file: &str, cert_file: &str) -> Self {
        Self {
            key_file: key_file.to_string(),
            cert_file: cert_file.to_string(),
            pkcs12_file: None,
            keystore_file: None,
            alias: None,
            key_encoding: KeyEncoding::Pkcs1,
        }
    }

    fn with_keystore(mut self, pkcs12_file: Option<&str>, keystore_file: &str, alias: &str) -> Self {
        self.pkcs12_file = pkcs12_file.map(str::to_string);
        self.keystore_file = Some(keystore_file.to_string());
        self.alias = Some(alias.to_string());
        self
    }
}

/// Deployment-specific inputs to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Name of the Elasticsearch cluster (its offshoot name).
    pub cluster_name: String,
    pub namespace: String,
    pub organization: String,
    pub root_common_name: String,
    pub root: OutputNames,
    pub node: OutputNames,
    pub admin: OutputNames,
    pub sgadmin: OutputNames,
    pub client: OutputNames,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let mut node = OutputNames::pem_only("node-key.pem", "node.pem").with_keystore(
            Some("node.pkcs12"),
            "node.jks",
            "elasticsearch-node",
        );
        node.key_encoding = KeyEncoding::Pkcs8;

        Self {
            cluster_name: "elasticsearch".to_string(),
            namespace: "default".to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            root_common_name: DEFAULT_ROOT_COMMON_NAME.to_string(),
            root: OutputNames::pem_only("root-key.pem", "root-ca.pem").with_keystore(
                None,
                "root.jks",
                "root-ca",
            ),
            node,
            admin: OutputNames::pem_only("admin-key.pem", "admin.pem"),
            sgadmin: OutputNames::pem_only("sgadmin-key.pem", "sgadmin.pem").with_keystore(
                Some("sgadmin.pkcs12"),
                "sgadmin.jks",
                "elasticsearch-sgadmin",
            ),
            client: OutputNames::pem_only("client-key.pem", "client.pem").with_keystore(
                Some("client.pkcs12"),
                "client.jks",
                "elasticsearch-client",
            ),
        }
    }
}

/// Turns a [`CatalogConfig`] into concrete certificate profiles.
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    config: CatalogConfig,
    leaf_validity: Duration,
}

impl ProfileCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            leaf_validity: Duration::days(DEFAULT_LEAF_VALIDITY_DAYS),
        }
    }

    pub fn with_leaf_validity(mut self, validity: Duration) -> Self {
        self.leaf_validity = validity;
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Subject of the self-signed root.
    pub fn ca_subject(&self) -> DistinguishedName {
        DistinguishedName {
            common_name: self.config.root_common_name.clone(),
            organization: vec![self.config.organization.clone()],
        }
    }

    /// `<cluster>.<namespace>.svc`, the in-cluster service name.
    pub fn service_dns_name(&self) -> String {
        format!("{}.{}.svc", self.config.cluster_name, self.config.namespace)
    }

    /// The leaf profile for `kind`; the root has none since it is self-signed.
    pub fn profile(&self, kind: ProfileKind) -> Option<CertificateProfile> {
        let (common_name, dns_names) = match kind {
            ProfileKind::Root => return None,
            ProfileKind::Node => (self.config.cluster_name.clone(), vec![]),
            ProfileKind::Admin => (
                format!("{}-admin", self.config.cluster_name),
                vec!["localhost".to_string(), self.service_dns_name()],
            ),
            ProfileKind::SgAdmin => (
                SGADMIN_COMMON_NAME.to_string(),
                vec!["localhost".to_string()],
            ),
            ProfileKind::Client => (
                self.config.cluster_name.clone(),
                vec!["localhost".to_string(), self.service_dns_name()],
            ),
        };

        Some(
            CertificateProfile::builder()
                .common_name(common_name)
                .organization(vec![self.config.organization.clone()])
                .alt_names(AltNames {
                    dns_names,
                    ..AltNames::default()
                })
                .usages(vec![
                    ExtendedKeyUsageOption::ServerAuth,
                    ExtendedKeyUsageOption::ClientAuth,
                ])
                .validity(self.leaf_validity)
                .build(),
        )
    }

    pub fn output(&self, kind: ProfileKind) -> &OutputNames {
        match kind {
            ProfileKind::Root => &self.config.root,
            ProfileKind::Node => &self.config.node,
            ProfileKind::Admin => &self.config.admin,
            ProfileKind::SgAdmin => &self.config.sgadmin,
            ProfileKind::Client => &self.config.client,
        }
    }
}
