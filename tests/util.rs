#![allow(dead_code)]

use espki::cert::params::{AltNames, CertificateProfile, DistinguishedName, ExtendedKeyUsageOption};
use espki::cert::{CaIdentity, CaOptions};

/// Key size used throughout the integration tests.
pub const TEST_KEY_BITS: usize = 2048;

pub fn generate_ca_cert(common_name: &str) -> CaIdentity {
    let _ = env_logger::builder().is_test(true).try_init();

    let subject = DistinguishedName::builder()
        .common_name(common_name)
        .organization(vec!["Elasticsearch Operator".to_string()])
        .build();
    let options = CaOptions::builder().key_bits(TEST_KEY_BITS).build();
    CaIdentity::issue_with(&subject, &options).expect("failed to issue test CA")
}

pub fn node_profile() -> CertificateProfile {
    CertificateProfile::builder()
        .common_name("node.example")
        .alt_names(AltNames {
            dns_names: vec!["node.example".to_string(), "localhost".to_string()],
            ..AltNames::default()
        })
        .usages(vec![
            ExtendedKeyUsageOption::ServerAuth,
            ExtendedKeyUsageOption::ClientAuth,
        ])
        .build()
}
