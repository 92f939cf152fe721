//! Key derivation and envelope authentication.
//!
//! The root key is `SHA256(salt || secret || salt)`. This is not a standard
//! KDF; it must stay byte-for-byte identical or previously sealed values can
//! no longer be opened.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, Result};

/// Length of the derived root key.
pub const KEY_LEN: usize = 32;

/// Length of an HMAC-SHA256 tag.
pub const MAC_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// 32-byte root key derived from a secret and salt.
///
/// The cipher uses a prefix of it sized for the AES variant; the MAC always
/// uses all 32 bytes. Zeroed on drop.
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    /// Derive the root key from an explicit secret and salt.
    pub fn derive(secret: &str, salt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(secret.as_bytes());
        hasher.update(salt.as_bytes());
        Self(hasher.finalize().into())
    }

    /// The first `len` bytes, used as the AES key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if `len` exceeds [`KEY_LEN`].
    pub fn cipher_key(&self, len: usize) -> Result<&[u8]> {
        self.0.get(..len).ok_or(CryptoError::InvalidKeyLength(len))
    }

    /// HMAC-SHA256 of `data` keyed with the full root key.
    pub fn mac(&self, data: &[u8]) -> Result<[u8; MAC_LEN]> {
        let mut mac = self.hmac()?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }

    /// Constant-time check of `tag` against the HMAC of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::IntegrityCheckFailed`] on mismatch.
    pub fn verify_mac(&self, data: &[u8], tag: &[u8]) -> Result<()> {
        let mut mac = self.hmac()?;
        mac.update(data);
        mac.verify_slice(tag)
            .map_err(|_| CryptoError::IntegrityCheckFailed)
    }

    fn hmac(&self) -> Result<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(&self.0)
            .map_err(|_| CryptoError::InvalidKeyLength(KEY_LEN))
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_wraps_secret() {
        let expected: [u8; KEY_LEN] = Sha256::digest(b"saltsecretsalt").into();
        let key = DerivedKey::derive("secret", "salt");
        assert_eq!(key.cipher_key(KEY_LEN).unwrap(), expected.as_slice());
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = DerivedKey::derive("k", "s");
        let b = DerivedKey::derive("k", "s");
        assert_eq!(a.cipher_key(KEY_LEN).unwrap(), b.cipher_key(KEY_LEN).unwrap());
    }

    #[test]
    fn secret_and_salt_are_not_interchangeable() {
        let a = DerivedKey::derive("ab", "c");
        let b = DerivedKey::derive("c", "ab");
        assert_ne!(a.cipher_key(KEY_LEN).unwrap(), b.cipher_key(KEY_LEN).unwrap());
    }

    #[test]
    fn cipher_key_is_a_prefix() {
        let key = DerivedKey::derive("k", "s");
        let full = key.cipher_key(KEY_LEN).unwrap().to_vec();
        assert_eq!(key.cipher_key(16).unwrap(), &full[..16]);
        assert_eq!(key.cipher_key(24).unwrap(), &full[..24]);
        assert!(key.cipher_key(33).is_err());
    }

    #[test]
    fn mac_verifies_and_rejects() {
        let key = DerivedKey::derive("k", "s");
        let tag = key.mac(b"ciphertext").unwrap();
        assert!(key.verify_mac(b"ciphertext", &tag).is_ok());
        assert!(matches!(
            key.verify_mac(b"ciphertexT", &tag),
            Err(CryptoError::IntegrityCheckFailed)
        ));
        assert!(matches!(
            key.verify_mac(b"ciphertext", &tag[..31]),
            Err(CryptoError::IntegrityCheckFailed)
        ));
    }

    #[test]
    fn derived_key_redacted_in_debug() {
        let key = DerivedKey::derive("k", "s");
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
