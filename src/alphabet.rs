// Candidate byte orderings.
//
// The attack tries candidate plaintext bytes in alphabet order and stops at
// the first one the oracle accepts. Putting likely bytes first cuts down the
// number of oracle queries: printable text rarely needs more than a few
// dozen tries per byte where a plain 255..0 sweep averages over a hundred.
//
// Every constructor here returns a complete alphabet (all 256 values), so a
// correct oracle always accepts some candidate.

const DIGITS: &str = "0123456789";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
const WHITESPACE: &str = " \t\n\r\x0b\x0c";
const JSON_SPECIAL: &str = "{}[]\": ,\\";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet(Vec<u8>);

impl Alphabet {
    /// Build an alphabet from `bytes`, keeping the first occurrence of each
    /// value. With `complete`, every value missing from `bytes` is appended
    /// from 255 down to 0.
    pub fn from_bytes<I>(bytes: I, complete: bool) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let mut seen = [false; 256];
        let mut alpha = Vec::with_capacity(256);
        let missing = (0..=u8::MAX).rev().filter(|_| complete);
        for byte in bytes.into_iter().chain(missing) {
            if !seen[byte as usize] {
                seen[byte as usize] = true;
                alpha.push(byte);
            }
        }
        Self(alpha)
    }

    /// Build an alphabet from the bytes of `chars`.
    pub fn from_chars(chars: &str, complete: bool) -> Self {
        Self::from_bytes(chars.bytes(), complete)
    }

    /// All byte values, 255 down to 0.
    pub fn full() -> Self {
        Self((0..=u8::MAX).rev().collect())
    }

    /// Printable ASCII first, for text plaintexts.
    pub fn printable_ascii() -> Self {
        Self::from_chars(&printable(), true)
    }

    /// JSON structure characters, then alphanumerics, then the rest of
    /// printable ASCII.
    pub fn json() -> Self {
        let printable = printable();
        let chars = [JSON_SPECIAL, LOWERCASE, DIGITS, UPPERCASE, printable.as_str()].concat();
        Self::from_chars(&chars, true)
    }

    /// Ordering used while the final block's padding is being recovered.
    ///
    /// PKCS#7 padding bytes are small, so the values `block_size` down to 0
    /// come first. Descending order matters: with real padding of length `p`
    /// the candidate `1` also yields valid padding (it makes the last byte
    /// read `p`), so the true value `p` has to be tried before it.
    pub fn padding(block_size: usize) -> Self {
        let top = block_size.min(u8::MAX as usize) as u8;
        Self::from_bytes((0..=top).rev().chain(top..=u8::MAX), false)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every byte value appears, which guarantees termination
    /// against a correct oracle.
    pub fn is_complete(&self) -> bool {
        self.0.len() == 256
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::printable_ascii()
    }
}

impl FromIterator<u8> for Alphabet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self::from_bytes(iter, false)
    }
}

impl AsRef<[u8]> for Alphabet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn printable() -> String {
    [DIGITS, LOWERCASE, UPPERCASE, PUNCTUATION, WHITESPACE].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(Alphabet::full())]
    #[case(Alphabet::printable_ascii())]
    #[case(Alphabet::json())]
    #[case(Alphabet::padding(16))]
    #[case(Alphabet::padding(8))]
    #[case(Alphabet::from_chars("hello", true))]
    fn alphabets_are_complete_and_distinct(#[case] alphabet: Alphabet) {
        let mut values = alphabet.as_slice().to_vec();
        values.sort_unstable();
        values.dedup();

        assert!(alphabet.is_complete());
        assert_eq!(values.len(), 256);
    }

    #[test]
    fn from_chars_keeps_first_occurrence_order() {
        let alphabet = Alphabet::from_chars("abca", false);

        assert_eq!(alphabet.as_slice(), b"abc");
    }

    #[test]
    fn from_chars_appends_missing_values_in_descending_order() {
        let alphabet = Alphabet::from_chars("a", true);

        assert_eq!(&alphabet.as_slice()[..4], &[b'a', 255, 254, 253]);
        assert_eq!(alphabet.as_slice().last(), Some(&0));
    }

    #[test]
    fn json_alphabet_starts_with_structure_characters() {
        let alphabet = Alphabet::json();

        assert_eq!(&alphabet.as_slice()[..9], b"{}[]\": ,\\");
        assert_eq!(alphabet.as_slice()[9], b'a');
    }

    #[test]
    fn printable_ascii_is_default() {
        let alphabet = Alphabet::default();

        assert_eq!(alphabet, Alphabet::printable_ascii());
        assert_eq!(&alphabet.as_slice()[..3], b"012");
    }

    #[test]
    fn padding_alphabet_tries_padding_values_first() {
        let alphabet = Alphabet::padding(4);

        assert_eq!(&alphabet.as_slice()[..8], &[4, 3, 2, 1, 0, 5, 6, 7]);
        assert_eq!(alphabet.as_slice().last(), Some(&255));
    }
}
