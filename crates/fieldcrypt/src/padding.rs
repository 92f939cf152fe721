//! PKCS#7 padding for block modes.

use crate::error::{CryptoError, Result};

/// Pad `data` up to the next multiple of `block_size`.
///
/// Always appends between 1 and `block_size` bytes, each equal to the pad
/// length, so aligned input gains a whole extra block.
pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad_len = block_size - data.len() % block_size;
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    // block_size never exceeds 255 for any cipher this crate registers.
    out.resize(data.len() + pad_len, pad_len as u8);
    out
}

/// Strip PKCS#7 padding.
///
/// Empty input is returned unchanged.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidPadding`] if the pad length exceeds the
/// input or the trailing bytes do not all equal the pad length.
pub fn unpad(mut data: Vec<u8>) -> Result<Vec<u8>> {
    let Some(&last) = data.last() else {
        return Ok(data);
    };
    let pad_len = usize::from(last);
    if pad_len > data.len() {
        return Err(CryptoError::InvalidPadding);
    }
    let body_len = data.len() - pad_len;
    if data[body_len..].iter().any(|&b| b != last) {
        return Err(CryptoError::InvalidPadding);
    }
    data.truncate(body_len);
    Ok(data)
}
