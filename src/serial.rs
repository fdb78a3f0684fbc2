use rand_core::{OsRng, RngCore};

use crate::error::{PkiError, Result};

/// A certificate serial number drawn from `[0, 2^63)`.
///
/// Serials are random, not tracked: two certificates from the same CA collide
/// with probability about 2^-63 per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SerialNumber(u64);

impl SerialNumber {
    /// Largest value (exclusive) a serial may take.
    pub const LIMIT: u64 = 1 << 63;

    /// Draws a fresh serial from the OS random number generator.
    pub fn random() -> Self {
        Self(OsRng.next_u64() >> 1)
    }

    /// Wraps an explicit value, rejecting anything outside `[0, 2^63)`.
    pub fn new(value: u64) -> Result<Self> {
        if value >= Self::LIMIT {
            return Err(PkiError::EncodingError(format!(
                "serial number {value} does not fit in 63 bits"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Minimal big-endian two's complement bytes of the (always positive) value.
    fn to_be_bytes_minimal(self) -> Vec<u8> {
        let bytes = self.0.to_be_bytes();
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
        let mut out = Vec::with_capacity(9);
        if bytes[first] & 0x80 != 0 {
            out.push(0);
        }
        out.extend_from_slice(&bytes[first..]);
        out
    }

    pub fn to_x509(&self) -> Result<x509_cert::serial_number::SerialNumber> {
        Ok(x509_cert::serial_number::SerialNumber::new(
            &self.to_be_bytes_minimal(),
        )?)
    }

    pub fn from_x509(serial: &x509_cert::serial_number::SerialNumber) -> Result<Self> {
        let bytes = serial.as_bytes();
        let significant = match bytes.iter().position(|b| *b != 0) {
            Some(first) => &bytes[first..],
            None => &[],
        };
        if significant.len() > 8 || bytes.first().is_some_and(|b| b & 0x80 != 0) {
            return Err(PkiError::DecodeError(
                "serial number is not a 63-bit positive integer".to_string(),
            ));
        }
        let value = significant
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        Self::new(value)
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
