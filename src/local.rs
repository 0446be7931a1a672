// An in-process padding oracle.
//
// Encrypts with AES-128 in CBC mode and PKCS#7 padding, and answers padding
// queries by decrypting and checking the padding, exactly like a careless
// server would. Ciphertexts are hex strings with the IV as the first block.
use aes::{
    cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit},
    Aes128,
};

use crate::{pkcs7_pad, pkcs7_unpad, Oracle, OracleFailure};

const BLOCK_SIZE: usize = 16;

#[derive(Clone)]
pub struct CbcPaddingOracle {
    cipher: Aes128,
}

impl CbcPaddingOracle {
    pub fn new(key: [u8; BLOCK_SIZE]) -> Self {
        Self {
            cipher: Aes128::new(GenericArray::from_slice(&key)),
        }
    }

    pub fn random() -> Self {
        Self::new(rand::random())
    }

    /// Encrypt `plaintext` under a fresh random IV.
    pub fn encrypt(&self, plaintext: &[u8]) -> String {
        self.encrypt_with_iv(plaintext, &rand::random())
    }

    pub fn encrypt_with_iv(&self, plaintext: &[u8], iv: &[u8; BLOCK_SIZE]) -> String {
        let padded = pkcs7_pad(plaintext, BLOCK_SIZE);
        let mut ciphertext = Vec::with_capacity(padded.len() + BLOCK_SIZE);
        ciphertext.extend_from_slice(iv);

        let mut last_block = *iv;
        for plaintext_block in padded.chunks(BLOCK_SIZE) {
            let mut block = GenericArray::clone_from_slice(plaintext_block);
            block
                .iter_mut()
                .zip(last_block)
                .for_each(|(b, prev)| *b ^= prev);
            self.cipher.encrypt_block(&mut block);
            last_block.copy_from_slice(&block);
            ciphertext.extend_from_slice(&block);
        }
        hex::encode(ciphertext)
    }

    /// Decrypt and unpad a hex ciphertext. `None` if it is not hex, not a
    /// whole number of blocks (IV included), or the padding is invalid.
    pub fn decrypt(&self, ciphertext_hex: &str) -> Option<Vec<u8>> {
        let ciphertext = hex::decode(ciphertext_hex).ok()?;
        if ciphertext.len() < 2 * BLOCK_SIZE || ciphertext.len() % BLOCK_SIZE != 0 {
            return None;
        }

        let mut message = Vec::with_capacity(ciphertext.len() - BLOCK_SIZE);
        for pair in ciphertext.windows(2 * BLOCK_SIZE).step_by(BLOCK_SIZE) {
            let (last_block, ciphertext_block) = pair.split_at(BLOCK_SIZE);
            let mut block = GenericArray::clone_from_slice(ciphertext_block);
            self.cipher.decrypt_block(&mut block);
            message.extend(block.iter().zip(last_block).map(|(b, prev)| b ^ prev));
        }
        pkcs7_unpad(&mut message, BLOCK_SIZE)?;
        Some(message)
    }

    pub fn is_padding_valid(&self, ciphertext_hex: &str) -> bool {
        self.decrypt(ciphertext_hex).is_some()
    }
}

impl Oracle for CbcPaddingOracle {
    fn query(&self, ciphertext_hex: &str) -> Result<bool, OracleFailure> {
        Ok(self.is_padding_valid(ciphertext_hex))
    }
}
