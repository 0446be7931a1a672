use std::{fmt, str::FromStr, time::Duration};

use crate::{PaddingOracleError, ProgressEvent, ProgressObserver, Result};

/// A transient failure raised by an oracle, e.g. a dropped connection.
pub type OracleFailure = Box<dyn std::error::Error + Send + Sync>;

/// Something that tells us whether a ciphertext has valid padding.
///
/// The query is the hex encoding of two blocks: an attacker-controlled IV
/// followed by the target cipher block. Return `Ok(true)` iff the padding is
/// accepted. Returning `Err` signals a transient failure that will be
/// retried.
pub trait Oracle {
    fn query(&self, ciphertext_hex: &str) -> std::result::Result<bool, OracleFailure>;
}

impl<F> Oracle for F
where
    F: Fn(&str) -> std::result::Result<bool, OracleFailure>,
{
    fn query(&self, ciphertext_hex: &str) -> std::result::Result<bool, OracleFailure> {
        self(ciphertext_hex)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxRetries {
    Bounded(u32),
    Unbounded,
}

impl FromStr for MaxRetries {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "unbounded" => Ok(Self::Unbounded),
            n => n
                .parse()
                .map(Self::Bounded)
                .map_err(|e| format!("max retries must be 'unbounded' or a count: {e}")),
        }
    }
}

impl fmt::Display for MaxRetries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{n}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: MaxRetries,
    pub wait: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 10;
    pub const DEFAULT_WAIT: Duration = Duration::from_secs(3);

    pub fn new(max_retries: MaxRetries, wait: Duration) -> Self {
        Self { max_retries, wait }
    }

    fn exhausted(&self, retries: u32) -> bool {
        match self.max_retries {
            MaxRetries::Bounded(max) => retries >= max,
            MaxRetries::Unbounded => false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            MaxRetries::Bounded(Self::DEFAULT_MAX_RETRIES),
            Self::DEFAULT_WAIT,
        )
    }
}

/// Calls an [`Oracle`], retrying failures according to a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct OracleInvoker<O> {
    oracle: O,
    policy: RetryPolicy,
}

impl<O: Oracle> OracleInvoker<O> {
    pub fn new(oracle: O, policy: RetryPolicy) -> Self {
        Self { oracle, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: RetryPolicy) {
        self.policy = policy;
    }

    /// Ask the oracle about `ciphertext_hex`.
    ///
    /// Every failure is reported to `observer` and counted. Once the count
    /// reaches a bounded `max_retries` the last failure is returned wrapped
    /// in [`PaddingOracleError::OracleExhausted`]; otherwise we sleep for
    /// the policy's wait and try again. The first attempt is always made,
    /// so `Bounded(0)` means "never retry".
    pub fn invoke(&self, ciphertext_hex: &str, observer: &dyn ProgressObserver) -> Result<bool> {
        let mut retries = 0;
        loop {
            match self.oracle.query(ciphertext_hex) {
                Ok(valid) => return Ok(valid),
                Err(error) => {
                    retries += 1;
                    observer.notify(&ProgressEvent::OracleError {
                        error: &*error,
                        retries,
                    });
                    if self.policy.exhausted(retries) {
                        return Err(PaddingOracleError::OracleExhausted {
                            retries,
                            source: error,
                        });
                    }
                    std::thread::sleep(self.policy.wait);
                }
            }
        }
    }
}
