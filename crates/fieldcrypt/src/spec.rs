//! Parsing of cipher spec strings such as `"AES-256-CBC"`.

use std::fmt;

use crate::error::{CryptoError, Result};
use crate::modes::{self, CipherModeDescriptor};

/// The only supported block cipher.
pub const ALGORITHM: &str = "AES";

/// Supported key sizes in bits, as they appear in spec strings.
pub const KEY_SIZES: [&str; 3] = ["128", "192", "256"];

/// A validated `{algorithm}-{key size}-{mode}` triple.
#[derive(Clone, Copy)]
pub struct CipherSpec {
    key_size_bits: usize,
    mode: &'static CipherModeDescriptor,
}

impl CipherSpec {
    /// Parse a spec string, case-insensitively.
    ///
    /// Surrounding whitespace is not stripped and makes the spec invalid.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::UndefinedCipherMethod`] for an empty string.
    /// - [`CryptoError::InvalidCipherFormat`] for anything other than
    ///   `AES-{128|192|256}-{CBC|OFB|CFB|CTR}`.
    pub fn parse(spec: &str) -> Result<Self> {
        if spec.is_empty() {
            return Err(CryptoError::UndefinedCipherMethod);
        }

        let upper = spec.to_uppercase();
        let fields: Vec<&str> = upper.split('-').collect();
        let [algorithm, size, mode] = fields.as_slice() else {
            return Err(CryptoError::InvalidCipherFormat);
        };

        if *algorithm != ALGORITHM {
            return Err(CryptoError::InvalidCipherFormat);
        }
        let mode = modes::lookup(mode).ok_or(CryptoError::InvalidCipherFormat)?;
        if !KEY_SIZES.contains(size) {
            return Err(CryptoError::InvalidCipherFormat);
        }
        let key_size_bits = size
            .parse::<usize>()
            .map_err(|_| CryptoError::InvalidCipherFormat)?;

        Ok(Self {
            key_size_bits,
            mode,
        })
    }

    pub fn key_size_bits(&self) -> usize {
        self.key_size_bits
    }

    /// AES key length in bytes (16, 24 or 32).
    pub fn key_len(&self) -> usize {
        self.key_size_bits / 8
    }

    pub fn mode(&self) -> &'static CipherModeDescriptor {
        self.mode
    }
}

impl fmt::Display for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ALGORITHM}-{}-{}", self.key_size_bits, self.mode.name())
    }
}

impl fmt::Debug for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherSpec({self})")
    }
}

/// Resolve a spec string to its mode descriptor and AES key length in bytes.
///
/// # Errors
///
/// See [`CipherSpec::parse`].
pub fn resolve(spec: &str) -> Result<(&'static CipherModeDescriptor, usize)> {
    let parsed = CipherSpec::parse(spec)?;
    Ok((parsed.mode(), parsed.key_len()))
}
