use super::PaddingOracle;
use crate::{xor_bytes, Alphabet, Oracle, PaddingOracleError, ProgressEvent, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedBlock {
    pub plain: Vec<u8>,
    /// The block cipher output for the target block, before the XOR with
    /// its IV.
    pub intermediate: Vec<u8>,
    /// PKCS#7 padding length read from the last byte when padding detection
    /// was requested, otherwise 0.
    pub padding_length: usize,
}

impl<O: Oracle> PaddingOracle<O> {
    /// Recover the plaintext of `cipher_block` as decrypted under `iv_block`.
    ///
    /// Bytes are attacked from last to first. `pre_known` holds trailing
    /// plaintext bytes that are already known and are not queried for. With
    /// `detect_padding`, the last byte is taken to be the PKCS#7 padding
    /// length and the padding bytes are searched with
    /// [`Alphabet::padding`] before switching to `alphabet`.
    ///
    /// The first candidate the oracle accepts wins. A candidate that happens
    /// to produce valid padding of a different length is not told apart from
    /// the real one.
    pub fn decrypt_block(
        &self,
        iv_block: &[u8],
        cipher_block: &[u8],
        pre_known: &[u8],
        detect_padding: bool,
        alphabet: &Alphabet,
    ) -> Result<DecryptedBlock> {
        let block_size = self.block_size;
        check_size("IV", block_size, iv_block.len())?;
        check_size("cipher", block_size, cipher_block.len())?;
        if pre_known.len() > block_size {
            return Err(PaddingOracleError::SizeMismatch {
                what: "known plaintext",
                expected: block_size,
                actual: pre_known.len(),
            });
        }

        let mut plain = vec![0u8; block_size];
        plain[(block_size - pre_known.len())..].copy_from_slice(pre_known);

        let padding_alphabet = Alphabet::padding(block_size);
        let mut padding_length = if detect_padding { 1 } else { 0 };
        let cipher_hex = hex::encode(cipher_block);
        for round in pre_known.len()..block_size {
            let index = block_size - round - 1;
            let candidates = if round < padding_length {
                &padding_alphabet
            } else {
                alphabet
            };

            let plain_byte =
                self.solve_byte(iv_block, &plain, index, round, candidates, &cipher_hex)?;
            plain[index] = plain_byte;

            if detect_padding && round == 0 {
                padding_length = plain_byte as usize;
            }
        }

        let intermediate = xor_bytes(&plain, iv_block)?;
        Ok(DecryptedBlock {
            plain,
            intermediate,
            padding_length,
        })
    }

    /// Find the plaintext byte at `index`, given that every byte after it is
    /// already in `plain`.
    fn solve_byte(
        &self,
        iv_block: &[u8],
        plain: &[u8],
        index: usize,
        round: usize,
        alphabet: &Alphabet,
        cipher_hex: &str,
    ) -> Result<u8> {
        let target_pad = (round + 1) as u8;

        // Each round works on its own copy of the IV. The solved bytes are
        // set so they decrypt to the padding value we are forcing.
        let mut forced_iv = iv_block.to_vec();
        for j in (index + 1)..self.block_size {
            forced_iv[j] = iv_block[j] ^ plain[j] ^ target_pad;
        }

        for (attempt, candidate) in alphabet.iter().enumerate() {
            forced_iv[index] = iv_block[index] ^ candidate ^ target_pad;
            let query = format!("{}{cipher_hex}", hex::encode(&forced_iv));
            self.notify(ProgressEvent::ByteAttempt {
                iv_byte: forced_iv[index],
                candidate,
                attempt,
                alphabet_len: alphabet.len(),
                round,
                block_size: self.block_size,
                query: &query,
            });

            if self.query(&query)? {
                let intermediate = target_pad ^ forced_iv[index];
                let plain_byte = intermediate ^ iv_block[index];
                self.notify(ProgressEvent::ByteFound {
                    index,
                    intermediate,
                    plain: plain_byte,
                });
                return Ok(plain_byte);
            }
        }

        Err(PaddingOracleError::NoAcceptedCandidate { position: index })
    }
}

fn check_size(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(PaddingOracleError::SizeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use rstest::rstest;

    use crate::{
        attack::test_support::{counting, seeded_iv, seeded_oracle, CandidateLog},
        split_blocks, OracleFailure,
    };

    fn last_pair(ciphertext: &str) -> (Vec<u8>, Vec<u8>) {
        let mut blocks = split_blocks(ciphertext, 16).unwrap();
        let cipher_block = blocks.pop().unwrap();
        (blocks.pop().unwrap(), cipher_block)
    }

    #[test]
    fn decrypt_block_recovers_plaintext_and_intermediate() {
        let oracle = seeded_oracle(101);
        let iv = seeded_iv(102);
        let ciphertext = oracle.encrypt_with_iv(b"I go crazy when I hear a cymbal", &iv);
        let blocks = split_blocks(&ciphertext, 16).unwrap();
        let attack = PaddingOracle::new(oracle);

        let block = attack
            .decrypt_block(&blocks[0], &blocks[1], &[], false, &Alphabet::default())
            .unwrap();

        assert_eq!(block.plain, b"I go crazy when ");
        assert_eq!(block.intermediate, xor_bytes(b"I go crazy when ", &iv).unwrap());
        assert_eq!(block.padding_length, 0);
    }

    #[rstest]
    #[case(b"fifteen bytes!!", 1)]
    #[case(b"fourteen bytes", 2)]
    #[case(b"eight ch", 8)]
    #[case(b"a", 15)]
    #[case(b"sixteen bytes!!!", 16)]
    fn decrypt_block_detects_padding_length(#[case] message: &[u8], #[case] expected: usize) {
        let oracle = seeded_oracle(7);
        let ciphertext = oracle.encrypt_with_iv(message, &seeded_iv(8));
        let (iv_block, cipher_block) = last_pair(&ciphertext);
        let attack = PaddingOracle::new(oracle);

        let block = attack
            .decrypt_block(&iv_block, &cipher_block, &[], true, &Alphabet::default())
            .unwrap();

        assert_eq!(block.padding_length, expected);
        assert!(block.plain[16 - expected..]
            .iter()
            .all(|&b| b as usize == expected));
    }

    #[test]
    fn full_padding_block_is_all_sixteens() {
        let oracle = seeded_oracle(11);
        let ciphertext = oracle.encrypt_with_iv(b"YELLOW SUBMARINE", &seeded_iv(12));
        let (iv_block, cipher_block) = last_pair(&ciphertext);
        let attack = PaddingOracle::new(oracle);

        let block = attack
            .decrypt_block(&iv_block, &cipher_block, &[], true, &Alphabet::default())
            .unwrap();

        assert_eq!(block.plain, vec![0x10; 16]);
        assert_eq!(block.padding_length, 16);
    }

    #[test]
    fn fully_known_block_makes_no_queries() {
        let calls = Arc::new(Mutex::new(0));
        let attack = PaddingOracle::new(counting(seeded_oracle(1), calls.clone()));
        let known = *b"already known!!!";

        let block = attack
            .decrypt_block(&[0u8; 16], &[1u8; 16], &known, true, &Alphabet::default())
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(block.plain, known);
        assert_eq!(block.intermediate, known);
    }

    #[test]
    fn partially_known_block_resumes_attack() {
        let oracle = seeded_oracle(21);
        let ciphertext = oracle.encrypt_with_iv(b"resume from here and beyond", &seeded_iv(22));
        let blocks = split_blocks(&ciphertext, 16).unwrap();
        let calls = Arc::new(Mutex::new(0));
        let attack = PaddingOracle::new(counting(oracle, calls.clone()));

        let full = attack
            .decrypt_block(&blocks[0], &blocks[1], &[], false, &Alphabet::default())
            .unwrap();
        let full_calls = std::mem::take(&mut *calls.lock().unwrap());
        let resumed = attack
            .decrypt_block(&blocks[0], &blocks[1], b"here", false, &Alphabet::default())
            .unwrap();

        assert_eq!(resumed, full);
        assert!(*calls.lock().unwrap() < full_calls);
    }

    #[test]
    fn candidates_are_tried_in_alphabet_order() {
        let oracle = seeded_oracle(31);
        let ciphertext = oracle.encrypt_with_iv(b"ordered search!!", &seeded_iv(32));
        let blocks = split_blocks(&ciphertext, 16).unwrap();
        let candidates = CandidateLog::default();
        let attack = PaddingOracle::new(oracle).with_observer(candidates.observer());
        let alphabet = Alphabet::json();

        let block = attack
            .decrypt_block(&blocks[0], &blocks[1], &[], false, &alphabet)
            .unwrap();

        let expected: Vec<u8> = block
            .plain
            .iter()
            .rev()
            .flat_map(|&b| {
                let end = alphabet.iter().position(|c| c == b).unwrap();
                alphabet.as_slice()[..=end].to_vec()
            })
            .collect();
        assert_eq!(candidates.take(), expected);
    }

    #[test]
    fn exhausted_alphabet_is_an_error() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let attack = PaddingOracle::new(move |_: &str| -> std::result::Result<bool, OracleFailure> {
            *counter.lock().unwrap() += 1;
            Ok(false)
        });
        let alphabet = Alphabet::from_chars("abc", false);

        let block = attack.decrypt_block(&[0u8; 16], &[0u8; 16], &[], false, &alphabet);

        assert!(matches!(
            block,
            Err(PaddingOracleError::NoAcceptedCandidate { position: 15 })
        ));
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[rstest]
    #[case(15, 16, 0)]
    #[case(16, 17, 0)]
    #[case(16, 16, 17)]
    fn wrong_sizes_are_rejected(
        #[case] iv_len: usize,
        #[case] cipher_len: usize,
        #[case] known_len: usize,
    ) {
        let attack = PaddingOracle::new(seeded_oracle(1));

        let block = attack.decrypt_block(
            &vec![0; iv_len],
            &vec![0; cipher_len],
            &vec![0; known_len],
            false,
            &Alphabet::default(),
        );

        assert!(matches!(block, Err(PaddingOracleError::SizeMismatch { .. })));
    }
}
