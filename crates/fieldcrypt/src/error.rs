//! Error type shared by every layer of the field cipher.

use thiserror::Error;

use crate::spec::{ALGORITHM, KEY_SIZES};

/// Errors produced while deriving keys, resolving cipher specs, or sealing and
/// opening envelopes.
///
/// Every variant is an ordinary recoverable failure. Callers that use
/// [`crate::Encryptor::decrypt`] as an "is this value already sealed?" check
/// are expected to treat any of them as "not sealed".
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Nothing to encrypt or decrypt.
    #[error("empty input")]
    EmptyInput,

    /// Neither the call nor the identity supplied a secret.
    #[error("undefined encryption key")]
    UndefinedKey,

    /// Neither the call nor the identity supplied a salt.
    #[error("undefined encryption salt")]
    UndefinedSalt,

    /// The identity carries an empty cipher spec string.
    #[error("undefined encryption cipher method")]
    UndefinedCipherMethod,

    /// The cipher spec string is not one of the supported combinations.
    #[error(
        "cipher method format is: {{{}}}-{{{}}}-{{{}}}",
        ALGORITHM,
        KEY_SIZES.join(","),
        crate::modes::names().join(",")
    )]
    InvalidCipherFormat,

    /// The envelope is not valid standard base64.
    #[error("envelope is not valid base64: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// The decoded envelope cannot even hold an IV and a MAC.
    #[error("envelope too short: {len} bytes")]
    EnvelopeTooShort {
        /// Decoded length in bytes.
        len: usize,
    },

    /// The stored MAC does not match the ciphertext (tampering, corruption, or
    /// wrong secret/salt).
    #[error("HMAC verification failed")]
    IntegrityCheckFailed,

    /// PKCS#7 padding is malformed.
    #[error("invalid bytes padding")]
    InvalidPadding,

    /// Key material does not match any AES key size.
    #[error("invalid AES key length: {0} bytes")]
    InvalidKeyLength(usize),

    /// A block-mode transform was handed a partial block.
    #[error("ciphertext length {len} is not a multiple of the cipher block size")]
    UnalignedCiphertext {
        /// Offending input length in bytes.
        len: usize,
    },

    /// An opened field was expected to hold UTF-8 text.
    #[error("decrypted field is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CryptoError>;
