//! Random secrets for fields the document leaves empty.

use rand::{rngs::OsRng, Rng};

const PASSWORD_ALPHABET: &[u8] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const ENCRYPTION_ALPHABET: &[u8] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ!@#$%^&*()%?*~{}";

/// Alphanumeric password suitable for a database role.
pub fn generate_password(len: usize) -> String {
    random_string(PASSWORD_ALPHABET, len)
}

/// Encryption secret or salt drawn from alphanumerics plus punctuation.
pub fn generate_encryption_string(len: usize) -> String {
    random_string(ENCRYPTION_ALPHABET, len)
}

fn random_string(alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| char::from(alphabet[OsRng.gen_range(0..alphabet.len())]))
        .collect()
}
