//! Issues the full certificate set for a cluster and writes it to disk.
//!
//! ```text
//! cargo run --example generate -- [config.toml] [output-dir]
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use espki::config::PkiConfig;
use espki::keystore::{DEFAULT_PASSPHRASE_LEN, generate_passphrase};
use espki::pki;
use espki::profiles::ProfileKind;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => PkiConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => PkiConfig::default(),
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "certs".to_string()));
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let catalog = config.catalog();
    let (ca, leaves) = pki::issue_all(&catalog, &config.ca_options(), config.key_bits)?;

    let root = catalog.output(ProfileKind::Root);
    fs::write(out_dir.join(&root.cert_file), ca.cert_pem()?)?;
    fs::write(out_dir.join(&root.key_file), ca.key_pem(root.key_encoding)?)?;

    for (kind, leaf) in &leaves {
        let names = catalog.output(*kind);
        fs::write(out_dir.join(&names.cert_file), &leaf.cert_pem)?;
        fs::write(out_dir.join(&names.key_file), &leaf.key_pem)?;

        let subject = pki::extract_subject(leaf.cert_pem.as_bytes())?;
        println!("{:<8} {} -> {}", kind.name(), subject, names.cert_file);
    }

    println!(
        "root     {} -> {} (keystore passphrase suggestion: {})",
        ca.subject(),
        root.cert_file,
        generate_passphrase(DEFAULT_PASSPHRASE_LEN)
    );
    Ok(())
}
