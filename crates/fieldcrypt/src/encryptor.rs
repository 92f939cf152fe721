//! Authenticated encryption of individual configuration fields.
//!
//! **Operation order on decrypt:** the ciphertext is transformed first, then
//! the MAC is checked, then padding is stripped. Envelopes already stored in
//! configuration files were produced against this order; see DESIGN.md before
//! changing it.

use rand::{rngs::OsRng, RngCore};
use tracing::{debug, trace};

use crate::envelope::{Envelope, IV_LEN};
use crate::error::{CryptoError, Result};
use crate::kdf::DerivedKey;
use crate::modes::BLOCK_SIZE;
use crate::padding;
use crate::spec::CipherSpec;

/// Default secret, default salt and cipher spec used for every operation.
///
/// Immutable once built and safe to share across threads.
#[derive(Clone)]
pub struct EncryptionIdentity {
    secret: String,
    salt: String,
    cipher_method: String,
}

impl EncryptionIdentity {
    pub fn new(
        secret: impl Into<String>,
        salt: impl Into<String>,
        cipher_method: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            salt: salt.into(),
            cipher_method: cipher_method.into(),
        }
    }

    /// The configured cipher spec string, e.g. `"AES-256-CBC"`.
    pub fn cipher_method(&self) -> &str {
        &self.cipher_method
    }

    /// Derive the root key, falling back to the identity's defaults for an
    /// empty `secret` or `salt`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UndefinedKey`] / [`CryptoError::UndefinedSalt`]
    /// when neither the argument nor the default is set.
    pub fn derive_key(&self, secret: &str, salt: &str) -> Result<DerivedKey> {
        let secret = non_empty_or(secret, &self.secret).ok_or(CryptoError::UndefinedKey)?;
        let salt = non_empty_or(salt, &self.salt).ok_or(CryptoError::UndefinedSalt)?;
        Ok(DerivedKey::derive(secret, salt))
    }
}

impl std::fmt::Debug for EncryptionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionIdentity")
            .field("secret", &"[REDACTED]")
            .field("salt", &"[REDACTED]")
            .field("cipher_method", &self.cipher_method)
            .finish()
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> Option<&'a str> {
    [value, fallback].into_iter().find(|v| !v.is_empty())
}

/// Seals and opens configuration fields for one [`EncryptionIdentity`].
///
/// Holds no mutable state; share it behind an `Arc` for concurrent use.
#[derive(Debug, Clone)]
pub struct Encryptor {
    identity: EncryptionIdentity,
}

impl Encryptor {
    pub fn new(identity: EncryptionIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &EncryptionIdentity {
        &self.identity
    }

    /// Encrypt `plaintext` and return the base64 envelope.
    ///
    /// Empty `secret` / `salt` select the identity defaults.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::EmptyInput`] if `plaintext` is empty.
    /// - Key, salt and cipher spec errors from derivation and resolution.
    pub fn encrypt(&self, plaintext: &[u8], secret: &str, salt: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Err(CryptoError::EmptyInput);
        }

        let key = self.identity.derive_key(secret, salt)?;
        let spec = CipherSpec::parse(&self.identity.cipher_method)?;
        let mode = spec.mode();

        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let mut ciphertext = if mode.needs_padding() {
            padding::pad(plaintext, BLOCK_SIZE)
        } else {
            plaintext.to_vec()
        };
        mode.transform_for_encrypt(key.cipher_key(spec.key_len())?, &iv)?
            .apply(&mut ciphertext)?;

        let mac = key.mac(&ciphertext)?;
        trace!(
            cipher = %spec,
            plaintext_len = plaintext.len(),
            ciphertext_len = ciphertext.len(),
            "field encrypted"
        );

        Ok(Envelope {
            iv,
            mac,
            ciphertext,
        }
        .encode())
    }

    /// Open a base64 envelope produced by [`Encryptor::encrypt`].
    ///
    /// # Errors
    ///
    /// - [`CryptoError::EmptyInput`] if `encoded` is empty.
    /// - [`CryptoError::Base64Decode`] / [`CryptoError::EnvelopeTooShort`] for
    ///   malformed envelopes.
    /// - [`CryptoError::IntegrityCheckFailed`] if the MAC does not match,
    ///   including when the secret or salt differ from those used to seal.
    /// - [`CryptoError::InvalidPadding`] for a block-mode plaintext whose
    ///   padding is malformed.
    pub fn decrypt(&self, encoded: &str, secret: &str, salt: &str) -> Result<Vec<u8>> {
        if encoded.is_empty() {
            return Err(CryptoError::EmptyInput);
        }

        let key = self.identity.derive_key(secret, salt)?;
        let spec = CipherSpec::parse(&self.identity.cipher_method)?;
        let mode = spec.mode();

        let envelope = Envelope::decode(encoded)?;

        let mut candidate = envelope.ciphertext.clone();
        mode.transform_for_decrypt(key.cipher_key(spec.key_len())?, &envelope.iv)?
            .apply(&mut candidate)?;

        key.verify_mac(&envelope.ciphertext, &envelope.mac)
            .inspect_err(|_| debug!(cipher = %spec, "envelope failed MAC verification"))?;

        if mode.needs_padding() {
            padding::unpad(candidate)
        } else {
            Ok(candidate)
        }
    }

    /// Encrypt a UTF-8 field with the identity defaults.
    ///
    /// # Errors
    ///
    /// See [`Encryptor::encrypt`].
    pub fn encrypt_str(&self, plaintext: &str) -> Result<String> {
        self.encrypt(plaintext.as_bytes(), "", "")
    }

    /// Decrypt a field with the identity defaults and interpret it as UTF-8.
    ///
    /// # Errors
    ///
    /// - Everything [`Encryptor::decrypt`] returns.
    /// - [`CryptoError::InvalidUtf8`] if the plaintext is not UTF-8; use
    ///   [`Encryptor::decrypt`] for binary fields.
    pub fn decrypt_to_string(&self, encoded: &str) -> Result<String> {
        let bytes = self.decrypt(encoded, "", "")?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Whether `value` already opens under the identity defaults.
    ///
    /// Any decrypt failure counts as "still plaintext"; this never panics on
    /// arbitrary input.
    pub fn is_sealed(&self, value: &str) -> bool {
        self.decrypt(value, "", "").is_ok()
    }
}
