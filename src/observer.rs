use log::{debug, info, trace, warn};

/// Progress reported while an attack runs. Observers only watch; nothing
/// they do feeds back into the attack.
#[derive(Debug)]
pub enum ProgressEvent<'a> {
    /// A candidate byte is about to be sent to the oracle.
    ByteAttempt {
        iv_byte: u8,
        candidate: u8,
        attempt: usize,
        alphabet_len: usize,
        round: usize,
        block_size: usize,
        query: &'a str,
    },
    /// The oracle failed and the query will be retried (or given up on).
    OracleError {
        error: &'a (dyn std::error::Error + Send + Sync),
        retries: u32,
    },
    ByteFound {
        index: usize,
        intermediate: u8,
        plain: u8,
    },
    BlockDecrypted {
        block_index: usize,
        block_count: usize,
        plain: &'a [u8],
        intermediate: &'a [u8],
    },
}

pub trait ProgressObserver {
    fn notify(&self, event: &ProgressEvent<'_>);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent<'_>),
{
    fn notify(&self, event: &ProgressEvent<'_>) {
        self(event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn notify(&self, _event: &ProgressEvent<'_>) {}
}

/// Forwards progress to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn notify(&self, event: &ProgressEvent<'_>) {
        match *event {
            ProgressEvent::ByteAttempt {
                iv_byte,
                candidate,
                attempt,
                alphabet_len,
                round,
                block_size,
                query,
            } => trace!(
                "trying {iv_byte:02x} ({:?}) (try {:3}/{alphabet_len:3} for byte {:2}/{block_size:2}) => {query}",
                candidate as char,
                attempt + 1,
                round + 1,
            ),
            ProgressEvent::OracleError { error, retries } => {
                warn!("oracle error (retry {retries}): {error}")
            }
            ProgressEvent::ByteFound {
                index,
                intermediate,
                plain,
            } => debug!(
                "found x{:02}={intermediate:02x} m{:02}={plain:02x}",
                index + 1,
                index + 1
            ),
            ProgressEvent::BlockDecrypted {
                block_index,
                block_count,
                plain,
                intermediate,
            } => {
                info!(
                    "block {}/{block_count}: {}",
                    block_index + 1,
                    hex::encode(plain)
                );
                debug!(
                    "block {}/{block_count}: plaintext={:?} intermediate={}",
                    block_index + 1,
                    String::from_utf8_lossy(plain),
                    hex::encode(intermediate)
                );
            }
        }
    }
}
