//! Envelope framing: `IV ‖ MAC ‖ ciphertext`, carried as standard base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{CryptoError, Result};
use crate::kdf::MAC_LEN;
use crate::modes::BLOCK_SIZE;

/// Length of the random IV at the start of every envelope.
pub const IV_LEN: usize = BLOCK_SIZE;

/// Smallest decodable envelope: an IV and a MAC with no ciphertext.
pub const MIN_ENVELOPE_LEN: usize = IV_LEN + MAC_LEN;

/// A decoded envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Random IV the cipher was initialised with.
    pub iv: [u8; IV_LEN],
    /// HMAC-SHA256 over `ciphertext`.
    pub mac: [u8; MAC_LEN],
    /// Encrypted (and, for block modes, padded) field bytes.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Concatenate the three parts and base64-encode them.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(MIN_ENVELOPE_LEN + self.ciphertext.len());
        raw.extend_from_slice(&self.iv);
        raw.extend_from_slice(&self.mac);
        raw.extend_from_slice(&self.ciphertext);
        STANDARD.encode(raw)
    }

    /// Decode a base64 envelope and split it into its parts.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Base64Decode`] for malformed base64 and
    /// [`CryptoError::EnvelopeTooShort`] if fewer than [`MIN_ENVELOPE_LEN`]
    /// bytes remain after decoding.
    pub fn decode(encoded: &str) -> Result<Self> {
        let raw = STANDARD.decode(encoded)?;
        if raw.len() < MIN_ENVELOPE_LEN {
            return Err(CryptoError::EnvelopeTooShort { len: raw.len() });
        }

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&raw[..IV_LEN]);
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&raw[IV_LEN..MIN_ENVELOPE_LEN]);

        Ok(Self {
            iv,
            mac,
            ciphertext: raw[MIN_ENVELOPE_LEN..].to_vec(),
        })
    }
}
