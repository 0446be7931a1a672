use rayon::prelude::*;

use super::{DecryptedBlock, PaddingOracle};
use crate::{split_blocks, Alphabet, Oracle, PaddingOracleError, ProgressEvent, Result};

impl<O: Oracle> PaddingOracle<O> {
    /// Decrypt a whole hex ciphertext whose first block is the IV.
    ///
    /// Returns the plaintext with its padding removed, and the padding
    /// length read from the final block.
    pub fn decrypt(&self, cipher_hex: &str, alphabet: &Alphabet) -> Result<(Vec<u8>, usize)> {
        let blocks = self.cipher_blocks(cipher_hex)?;
        let block_count = blocks.len() - 1;

        let mut decrypted = Vec::with_capacity(block_count);
        for (i, pair) in blocks.windows(2).enumerate() {
            // Only the final block carries the real padding.
            let detect_padding = i == block_count - 1;
            let block = self.decrypt_block(&pair[0], &pair[1], &[], detect_padding, alphabet)?;
            self.report_block(i, block_count, &block);
            decrypted.push(block);
        }
        Ok(join_blocks(decrypted))
    }

    pub(super) fn cipher_blocks(&self, cipher_hex: &str) -> Result<Vec<Vec<u8>>> {
        let blocks = split_blocks(cipher_hex, self.block_size)?;
        if blocks.len() < 2 {
            return Err(PaddingOracleError::MalformedCiphertext(format!(
                "need an IV and at least one block, got {} block(s)",
                blocks.len()
            )));
        }
        Ok(blocks)
    }

    fn report_block(&self, block_index: usize, block_count: usize, block: &DecryptedBlock) {
        self.notify(ProgressEvent::BlockDecrypted {
            block_index,
            block_count,
            plain: &block.plain,
            intermediate: &block.intermediate,
        });
    }
}

impl<O: Oracle + Sync> PaddingOracle<O> {
    /// Same as [`decrypt`](Self::decrypt), but the blocks are attacked
    /// concurrently on the rayon thread pool.
    ///
    /// Every (IV, block) pair is independent of the others, so the result
    /// is identical. Block events are reported in order once all blocks are
    /// done; byte events interleave.
    pub fn decrypt_parallel(
        &self,
        cipher_hex: &str,
        alphabet: &Alphabet,
    ) -> Result<(Vec<u8>, usize)> {
        let blocks = self.cipher_blocks(cipher_hex)?;
        let block_count = blocks.len() - 1;

        let decrypted = (0..block_count)
            .into_par_iter()
            .map(|i| {
                let detect_padding = i == block_count - 1;
                self.decrypt_block(&blocks[i], &blocks[i + 1], &[], detect_padding, alphabet)
            })
            .collect::<Result<Vec<_>>>()?;

        for (i, block) in decrypted.iter().enumerate() {
            self.report_block(i, block_count, block);
        }
        Ok(join_blocks(decrypted))
    }
}

fn join_blocks(blocks: Vec<DecryptedBlock>) -> (Vec<u8>, usize) {
    let padding_length = blocks.last().map_or(0, |b| b.padding_length);
    let mut plaintext: Vec<u8> = blocks.into_iter().flat_map(|b| b.plain).collect();
    // The padding length is not validated, so never trim more than we have.
    plaintext.truncate(plaintext.len().saturating_sub(padding_length));
    (plaintext, padding_length)
}
