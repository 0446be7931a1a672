// PKCS#7 padding.
//
// The last `p` bytes of a padded message all hold the value `p`, where
// `1 <= p <= block_size`. A message whose length is already a multiple of
// the block size still gets a full block of padding, so the final block of
// a padded message always carries padding.

pub fn pkcs7_pad(bytes: &[u8], block_size: usize) -> Vec<u8> {
    let n_pad = block_size - bytes.len() % block_size;
    let mut out = Vec::with_capacity(bytes.len() + n_pad);
    out.extend_from_slice(bytes);
    out.resize(bytes.len() + n_pad, n_pad as u8);
    out
}

/// Length of the PKCS#7 padding on `bytes`, or `None` if the padding is
/// not well formed for the given block size.
pub fn pkcs7_padding_length(bytes: &[u8], block_size: usize) -> Option<usize> {
    let n_pad = *bytes.last()? as usize;
    if n_pad == 0 || n_pad > block_size || n_pad > bytes.len() {
        return None;
    }
    let padded = &bytes[(bytes.len() - n_pad)..];
    if padded.iter().all(|&el| el as usize == n_pad) {
        return Some(n_pad);
    }
    None
}

pub fn pkcs7_unpad(bytes: &mut Vec<u8>, block_size: usize) -> Option<usize> {
    let n_pad = pkcs7_padding_length(bytes, block_size)?;
    bytes.truncate(bytes.len() - n_pad);
    Some(n_pad)
}
