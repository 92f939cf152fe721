//! Authenticated AES encryption of secret configuration fields.
//!
//! # Envelope format
//!
//! ```text
//! base64( IV (16 bytes) ‖ HMAC-SHA256 (32 bytes) ‖ ciphertext (N bytes) )
//! ```
//!
//! - The cipher is chosen at runtime from a spec string such as
//!   `"AES-256-CBC"` (`AES-{128|192|256}-{CBC|OFB|CFB|CTR}`).
//! - The root key is `SHA256(salt ‖ secret ‖ salt)`. The cipher uses its first
//!   16, 24 or 32 bytes; the MAC always uses all 32.
//! - CBC plaintext is PKCS#7-padded; OFB, CFB and CTR are not.
//!
//! # Example
//!
//! ```
//! use fieldcrypt::{EncryptionIdentity, Encryptor};
//!
//! let enc = Encryptor::new(EncryptionIdentity::new("k", "s", "AES-256-CBC"));
//! let sealed = enc.encrypt(b"hello world", "", "").unwrap();
//! assert_eq!(enc.decrypt(&sealed, "", "").unwrap(), b"hello world");
//! ```

pub mod encryptor;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod modes;
pub mod padding;
pub mod spec;

pub use encryptor::{EncryptionIdentity, Encryptor};
pub use error::{CryptoError, Result};
pub use spec::CipherSpec;
