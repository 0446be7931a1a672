use crate::{PaddingOracleError, Result};

pub fn xor_bytes(buf_a: &[u8], buf_b: &[u8]) -> Result<Vec<u8>> {
    if buf_a.len() != buf_b.len() {
        return Err(PaddingOracleError::SizeMismatch {
            what: "XOR operand",
            expected: buf_a.len(),
            actual: buf_b.len(),
        });
    }
    Ok(buf_a.iter().zip(buf_b.iter()).map(|(a, b)| a ^ b).collect())
}

/// Decode a hex ciphertext and split it into blocks of `block_size` bytes.
///
/// Upper and lower case hex are both accepted. The decoded length must be a
/// multiple of the block size.
pub fn split_blocks(cipher_hex: &str, block_size: usize) -> Result<Vec<Vec<u8>>> {
    let bytes = hex::decode(cipher_hex.trim())
        .map_err(|e| PaddingOracleError::MalformedCiphertext(format!("{e}")))?;
    if block_size == 0 || bytes.len() % block_size != 0 {
        return Err(PaddingOracleError::MalformedCiphertext(format!(
            "{} bytes is not a multiple of the block size {block_size}",
            bytes.len()
        )));
    }
    Ok(bytes.chunks(block_size).map(<[u8]>::to_vec).collect())
}
