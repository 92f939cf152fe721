//! Registry of supported AES modes of operation.
//!
//! Each mode produces a [`Transform`] in one of two shapes:
//!
//! - [`Transform::Block`] works on whole cipher blocks and therefore needs the
//!   plaintext padded first (CBC).
//! - [`Transform::Stream`] XORs a keystream over input of any length (OFB,
//!   CFB, CTR).
//!
//! The table is a process-wide constant. Adding a mode means adding one row to
//! `MODES`; nothing else dispatches on mode names.

use aes::{Aes128, Aes192, Aes256};
use cipher::{
    generic_array::GenericArray, AsyncStreamCipher, BlockDecryptMut, BlockEncryptMut,
    BlockSizeUser, KeyIvInit, StreamCipher,
};

use crate::error::{CryptoError, Result};

/// AES block size, which is also the IV length for every registered mode.
pub const BLOCK_SIZE: usize = 16;

/// Capability shape of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    /// Fixed-size blocks; input must be padded.
    Block,
    /// Keystream over arbitrary-length input; no padding.
    Stream,
}

/// One-shot transform over whole cipher blocks.
pub trait BlockTransform {
    /// Encrypt or decrypt `data` in place.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UnalignedCiphertext`] if `data` is not a whole
    /// number of blocks.
    fn crypt_blocks(self: Box<Self>, data: &mut [u8]) -> Result<()>;
}

/// One-shot transform over bytes of any length.
pub trait StreamTransform {
    /// Encrypt or decrypt `data` in place.
    fn crypt(self: Box<Self>, data: &mut [u8]);
}

/// A keyed, IV-initialised mode instance ready to process one buffer.
pub enum Transform {
    Block(Box<dyn BlockTransform>),
    Stream(Box<dyn StreamTransform>),
}

impl Transform {
    /// Run the transform over `data` in place.
    pub fn apply(self, data: &mut [u8]) -> Result<()> {
        match self {
            Transform::Block(t) => t.crypt_blocks(data),
            Transform::Stream(t) => {
                t.crypt(data);
                Ok(())
            }
        }
    }
}

type Builder = fn(&[u8], &[u8]) -> Result<Transform>;

/// A registered mode of operation.
pub struct CipherModeDescriptor {
    name: &'static str,
    kind: ModeKind,
    encrypt: Builder,
    decrypt: Builder,
}

impl CipherModeDescriptor {
    /// Upper-case mode name as it appears in cipher spec strings.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ModeKind {
        self.kind
    }

    /// `true` for block modes, which need PKCS#7 padding.
    pub fn needs_padding(&self) -> bool {
        self.kind == ModeKind::Block
    }

    /// Build an encrypting transform keyed with `key` (16, 24 or 32 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] for any other key length.
    pub fn transform_for_encrypt(&self, key: &[u8], iv: &[u8]) -> Result<Transform> {
        (self.encrypt)(key, iv)
    }

    /// Build a decrypting transform keyed with `key` (16, 24 or 32 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] for any other key length.
    pub fn transform_for_decrypt(&self, key: &[u8], iv: &[u8]) -> Result<Transform> {
        (self.decrypt)(key, iv)
    }
}

impl std::fmt::Debug for CipherModeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherModeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

static MODES: [CipherModeDescriptor; 4] = [
    CipherModeDescriptor {
        name: "CBC",
        kind: ModeKind::Block,
        encrypt: cbc_encrypt,
        decrypt: cbc_decrypt,
    },
    CipherModeDescriptor {
        name: "OFB",
        kind: ModeKind::Stream,
        encrypt: ofb_keystream,
        decrypt: ofb_keystream,
    },
    CipherModeDescriptor {
        name: "CFB",
        kind: ModeKind::Stream,
        encrypt: cfb_encrypt,
        decrypt: cfb_decrypt,
    },
    CipherModeDescriptor {
        name: "CTR",
        kind: ModeKind::Stream,
        encrypt: ctr_keystream,
        decrypt: ctr_keystream,
    },
];

/// Look up a mode by its exact (upper-case) name.
pub fn lookup(name: &str) -> Option<&'static CipherModeDescriptor> {
    MODES.iter().find(|m| m.name == name)
}

/// Names of every registered mode, in registry order.
pub fn names() -> Vec<&'static str> {
    MODES.iter().map(|m| m.name).collect()
}

// ---------------------------------------------------------------------------
// Mode constructors
// ---------------------------------------------------------------------------

/// Expand `$build` once per AES key size, binding `$aes` to the matching
/// block cipher type.
macro_rules! by_key_size {
    ($key:expr, |$aes:ident| $build:expr) => {
        match $key.len() {
            16 => {
                type $aes = Aes128;
                $build
            }
            24 => {
                type $aes = Aes192;
                $build
            }
            32 => {
                type $aes = Aes256;
                $build
            }
            n => Err(CryptoError::InvalidKeyLength(n)),
        }
    };
}

fn init<M: KeyIvInit>(key: &[u8], iv: &[u8]) -> Result<M> {
    M::new_from_slices(key, iv).map_err(|_| CryptoError::InvalidKeyLength(key.len()))
}

fn cbc_encrypt(key: &[u8], iv: &[u8]) -> Result<Transform> {
    by_key_size!(key, |A| Ok(Transform::Block(Box::new(BlockEncrypting(
        init::<cbc::Encryptor<A>>(key, iv)?
    )))))
}

fn cbc_decrypt(key: &[u8], iv: &[u8]) -> Result<Transform> {
    by_key_size!(key, |A| Ok(Transform::Block(Box::new(BlockDecrypting(
        init::<cbc::Decryptor<A>>(key, iv)?
    )))))
}

fn ofb_keystream(key: &[u8], iv: &[u8]) -> Result<Transform> {
    by_key_size!(key, |A| Ok(Transform::Stream(Box::new(Keystream(
        init::<ofb::Ofb<A>>(key, iv)?
    )))))
}

fn cfb_encrypt(key: &[u8], iv: &[u8]) -> Result<Transform> {
    by_key_size!(key, |A| Ok(Transform::Stream(Box::new(FeedbackEncrypting(
        init::<cfb_mode::Encryptor<A>>(key, iv)?
    )))))
}

fn cfb_decrypt(key: &[u8], iv: &[u8]) -> Result<Transform> {
    by_key_size!(key, |A| Ok(Transform::Stream(Box::new(FeedbackDecrypting(
        init::<cfb_mode::Decryptor<A>>(key, iv)?
    )))))
}

fn ctr_keystream(key: &[u8], iv: &[u8]) -> Result<Transform> {
    by_key_size!(key, |A| Ok(Transform::Stream(Box::new(Keystream(
        init::<ctr::Ctr128BE<A>>(key, iv)?
    )))))
}

// ---------------------------------------------------------------------------
// Capability adapters
// ---------------------------------------------------------------------------

struct BlockEncrypting<M>(M);

struct BlockDecrypting<M>(M);

struct Keystream<M>(M);

struct FeedbackEncrypting<M>(M);

struct FeedbackDecrypting<M>(M);

fn ensure_aligned(data: &[u8], block_size: usize) -> Result<()> {
    if data.len() % block_size != 0 {
        return Err(CryptoError::UnalignedCiphertext { len: data.len() });
    }
    Ok(())
}

impl<M: BlockEncryptMut> BlockTransform for BlockEncrypting<M> {
    fn crypt_blocks(mut self: Box<Self>, data: &mut [u8]) -> Result<()> {
        ensure_aligned(data, M::block_size())?;
        for chunk in data.chunks_exact_mut(M::block_size()) {
            self.0.encrypt_block_mut(GenericArray::from_mut_slice(chunk));
        }
        Ok(())
    }
}

impl<M: BlockDecryptMut> BlockTransform for BlockDecrypting<M> {
    fn crypt_blocks(mut self: Box<Self>, data: &mut [u8]) -> Result<()> {
        ensure_aligned(data, M::block_size())?;
        for chunk in data.chunks_exact_mut(M::block_size()) {
            self.0.decrypt_block_mut(GenericArray::from_mut_slice(chunk));
        }
        Ok(())
    }
}

impl<M: StreamCipher> StreamTransform for Keystream<M> {
    fn crypt(mut self: Box<Self>, data: &mut [u8]) {
        self.0.apply_keystream(data);
    }
}

impl<M: AsyncStreamCipher + BlockEncryptMut + BlockSizeUser> StreamTransform
    for FeedbackEncrypting<M>
{
    fn crypt(self: Box<Self>, data: &mut [u8]) {
        let Self(mode) = *self;
        mode.encrypt(data);
    }
}

impl<M: AsyncStreamCipher + BlockDecryptMut + BlockSizeUser> StreamTransform
    for FeedbackDecrypting<M>
{
    fn crypt(self: Box<Self>, data: &mut [u8]) {
        let Self(mode) = *self;
        mode.decrypt(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    // NIST SP 800-38A, AES-128, first block of each example.
    const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
    const IV: &str = "000102030405060708090a0b0c0d0e0f";
    const CTR_IV: &str = "f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff";
    const PLAIN: &str = "6bc1bee22e409f96e93d7e117393172a";

    fn encrypt_block(mode: &str, iv: &str) -> Vec<u8> {
        let mut data = hex(PLAIN);
        lookup(mode)
            .unwrap()
            .transform_for_encrypt(&hex(KEY), &hex(iv))
            .unwrap()
            .apply(&mut data)
            .unwrap();
        data
    }

    #[test]
    fn cbc_known_answer() {
        assert_eq!(encrypt_block("CBC", IV), hex("7649abac8119b246cee98e9b12e9197d"));
    }

    #[test]
    fn ofb_known_answer() {
        assert_eq!(encrypt_block("OFB", IV), hex("3b3fd92eb72dad20333449f8e83cfb4a"));
    }

    #[test]
    fn cfb_known_answer() {
        assert_eq!(encrypt_block("CFB", IV), hex("3b3fd92eb72dad20333449f8e83cfb4a"));
    }

    #[test]
    fn ctr_known_answer() {
        assert_eq!(encrypt_block("CTR", CTR_IV), hex("874d6191b620e3261bef6864990db6ce"));
    }

    #[test]
    fn registry_contains_exactly_four_modes() {
        assert_eq!(names(), vec!["CBC", "OFB", "CFB", "CTR"]);
        assert_eq!(lookup("CBC").unwrap().kind(), ModeKind::Block);
        for name in ["OFB", "CFB", "CTR"] {
            assert_eq!(lookup(name).unwrap().kind(), ModeKind::Stream);
            assert!(!lookup(name).unwrap().needs_padding());
        }
        assert!(lookup("GCM").is_none());
        assert!(lookup("cbc").is_none());
    }

    #[test]
    fn stream_modes_round_trip_partial_blocks() {
        let iv = [7u8; BLOCK_SIZE];
        for key_len in [16, 24, 32] {
            let key = vec![0x11u8; key_len];
            for name in ["OFB", "CFB", "CTR"] {
                let mode = lookup(name).unwrap();
                let original = b"twenty-one bytes long".to_vec();
                let mut data = original.clone();
                mode.transform_for_encrypt(&key, &iv).unwrap().apply(&mut data).unwrap();
                assert_ne!(data, original, "{name}");
                mode.transform_for_decrypt(&key, &iv).unwrap().apply(&mut data).unwrap();
                assert_eq!(data, original, "{name}");
            }
        }
    }

    #[test]
    fn block_mode_rejects_partial_block() {
        let mode = lookup("CBC").unwrap();
        let mut data = vec![0u8; 20];
        let err = mode
            .transform_for_decrypt(&[0u8; 32], &[0u8; BLOCK_SIZE])
            .unwrap()
            .apply(&mut data)
            .unwrap_err();
        assert!(matches!(err, CryptoError::UnalignedCiphertext { len: 20 }));
    }

    #[test]
    fn unsupported_key_length_rejected() {
        let mode = lookup("CTR").unwrap();
        assert!(matches!(
            mode.transform_for_encrypt(&[0u8; 20], &[0u8; BLOCK_SIZE]),
            Err(CryptoError::InvalidKeyLength(20))
        ));
    }
}
