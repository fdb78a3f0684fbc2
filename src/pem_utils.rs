use crate::error::{PkiError, Result};

/// PEM label of an X.509 certificate.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Decode the first PEM block of `input` and return its DER contents.
///
/// Fails with [`PkiError::DecodeError`] when no block is found or its label is
/// not `expected_label`.
pub fn pem_to_der(input: &[u8], expected_label: &str) -> Result<Vec<u8>> {
    let pem = pem::parse(input).map_err(|e| PkiError::DecodeError(e.to_string()))?;
    if pem.tag() != expected_label {
        return Err(PkiError::DecodeError(format!(
            "expected a {expected_label} block, found {}",
            pem.tag()
        )));
    }
    Ok(pem.contents().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let pem = der_to_pem(&[0x30, 0x00], CERTIFICATE_LABEL);
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));
        assert_eq!(
            pem_to_der(pem.as_bytes(), CERTIFICATE_LABEL).unwrap(),
            vec![0x30, 0x00]
        );
    }

    #[test]
    fn test_wrong_label() {
        let pem = der_to_pem(&[0x30, 0x00], "PRIVATE KEY");
        assert!(matches!(
            pem_to_der(pem.as_bytes(), CERTIFICATE_LABEL),
            Err(PkiError::DecodeError(_))
        ));
    }

    #[test]
    fn test_not_pem() {
        assert!(matches!(
            pem_to_der(b"hello world", CERTIFICATE_LABEL),
            Err(PkiError::DecodeError(_))
        ));
    }
}
