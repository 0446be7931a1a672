use crate::oracle::OracleFailure;

pub type Result<T> = std::result::Result<T, PaddingOracleError>;

/// Errors that abort a decryption or forgery.
///
/// Transient oracle failures never surface here directly; they are retried
/// by the [`OracleInvoker`](crate::OracleInvoker) and only reported once the
/// retry policy gives up.
#[derive(Debug)]
pub enum PaddingOracleError {
    /// Block size outside `1..=255`.
    InvalidBlockSize(usize),
    /// An IV, cipher block or known-plaintext buffer has the wrong length.
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The ciphertext is not hex or cannot be split into enough blocks.
    MalformedCiphertext(String),
    /// Old and new plaintexts given to the forger differ in length.
    LengthMismatch { old: usize, new: usize },
    /// No byte of the alphabet made the oracle accept the padding.
    NoAcceptedCandidate { position: usize },
    /// The oracle kept failing until the retry policy ran out.
    OracleExhausted { retries: u32, source: OracleFailure },
    InvalidConfig(String),
}

impl std::fmt::Display for PaddingOracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidBlockSize(size) => {
                write!(f, "block size must be between 1 and 255, got {size}")
            }
            Self::SizeMismatch {
                what,
                expected,
                actual,
            } => write!(f, "{what} size is not block size: {actual} != {expected}"),
            Self::MalformedCiphertext(reason) => write!(f, "malformed ciphertext: {reason}"),
            Self::LengthMismatch { old, new } => {
                write!(f, "the plaintexts differ in size: old={old} new={new}")
            }
            Self::NoAcceptedCandidate { position } => write!(
                f,
                "no candidate byte produced valid padding at position {position}"
            ),
            Self::OracleExhausted { retries, source } => {
                write!(f, "oracle finally failed after {retries} retries: {source}")
            }
            Self::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl std::error::Error for PaddingOracleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OracleExhausted { source, .. } => Some(&**source),
            _ => None,
        }
    }
}
