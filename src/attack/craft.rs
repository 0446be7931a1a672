use std::collections::VecDeque;

use log::debug;

use super::PaddingOracle;
use crate::{pkcs7_pad, xor_bytes, Alphabet, Oracle, PaddingOracleError, Result};

impl<O: Oracle> PaddingOracle<O> {
    /// Forge a ciphertext that decrypts to `plain_new`, given a ciphertext
    /// `cipher_hex` known to decrypt to `plain_old`.
    ///
    /// Both plaintexts are PKCS#7 padded and must be the same length. We
    /// walk backwards from the final block, which is never touched. Blocks
    /// after the last edit keep their original IV. At the last edited block
    /// the intermediate block is unchanged, so the new IV is just
    ///
    /// ```text
    ///              IV' = IV ⊕ P_old ⊕ P_new.
    /// ```
    ///
    /// Every block before that now has a forged successor whose
    /// intermediate block we don't know, so we recover it with the oracle
    /// and set IV' = I' ⊕ P_new.
    pub fn craft(
        &self,
        cipher_hex: &str,
        plain_old: &[u8],
        plain_new: &[u8],
        alphabet: &Alphabet,
    ) -> Result<String> {
        if plain_old.len() != plain_new.len() {
            return Err(PaddingOracleError::LengthMismatch {
                old: plain_old.len(),
                new: plain_new.len(),
            });
        }

        let padded_old = pkcs7_pad(plain_old, self.block_size);
        let padded_new = pkcs7_pad(plain_new, self.block_size);
        let old_blocks: Vec<&[u8]> = padded_old.chunks(self.block_size).collect();
        let new_blocks: Vec<&[u8]> = padded_new.chunks(self.block_size).collect();
        let cipher_blocks = self.cipher_blocks(cipher_hex)?;
        if cipher_blocks.len() != old_blocks.len() + 1 {
            return Err(PaddingOracleError::MalformedCiphertext(format!(
                "{} plaintext block(s) need {} cipher blocks, got {}",
                old_blocks.len(),
                old_blocks.len() + 1,
                cipher_blocks.len()
            )));
        }

        let mut forged: VecDeque<Vec<u8>> = VecDeque::with_capacity(cipher_blocks.len());
        if let Some(last) = cipher_blocks.last() {
            forged.push_front(last.clone());
        }

        let mut changed = false;
        for i in (1..cipher_blocks.len()).rev() {
            let iv = &cipher_blocks[i - 1];
            let (old, new) = (old_blocks[i - 1], new_blocks[i - 1]);

            let forged_iv = if !changed && old == new {
                debug!("block {i} unchanged");
                iv.clone()
            } else if !changed {
                debug!("block {i} changed");
                changed = true;
                xor_bytes(&xor_bytes(old, new)?, iv)?
            } else {
                debug!("crafting new block {i}");
                let next = forged.front().ok_or_else(|| {
                    PaddingOracleError::MalformedCiphertext("no block to forge against".into())
                })?;
                let block = self.decrypt_block(iv, next, &[], false, alphabet)?;
                xor_bytes(new, &block.intermediate)?
            };
            forged.push_front(forged_iv);
        }

        Ok(hex::encode(forged.into_iter().flatten().collect::<Vec<u8>>()))
    }
}
