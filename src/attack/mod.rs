// CBC padding oracle attack.
//
// CBC decryption computes each plaintext block as
//
//                 P_i = D(C_i) ⊕ C_{i-1}.
//
// We call I_i = D(C_i) the intermediate block. If we send the oracle a two
// block ciphertext X|C_i, where X is a block we control, the server decrypts
// the second block to
//
//                 P'_i = I_i ⊕ X
//
// and tells us whether P'_i ends in valid PKCS#7 padding. By varying the
// last byte of X until the oracle says yes, we learn that P'_i ends in
// '\x01', hence I_i[15] = X[15] ⊕ '\x01' and P_i[15] = I_i[15] ⊕ C_{i-1}[15].
// Fixing the last byte of X so it decrypts to '\x02' lets us search for the
// second-to-last byte in the same way, and so on through the block. No key
// is needed at any point.
//
// The same relation runs the other way. Once I_i is known, any plaintext P
// can be made to come out of C_i by choosing C_{i-1} = I_i ⊕ P. Working from
// the last block to the first, recovering the intermediate block of each
// forged block in turn, we can forge a whole ciphertext.
//
// Below, 'X' is the working IV and the value we try at each position is a
// candidate plaintext byte rather than a raw IV byte, which lets the
// candidate order follow the expected plaintext.
mod block;
mod chain;
mod craft;

pub use block::DecryptedBlock;

use crate::{
    config::validate_block_size, AttackConfig, LogObserver, Oracle, OracleInvoker,
    ProgressEvent, ProgressObserver, Result, RetryPolicy,
};

/// A padding oracle attack against one oracle.
///
/// Decryption and forging are sequential by default: one oracle query at a
/// time, byte by byte, block by block.
pub struct PaddingOracle<O> {
    invoker: OracleInvoker<O>,
    block_size: usize,
    observer: Box<dyn ProgressObserver + Send + Sync>,
}

impl<O: Oracle> PaddingOracle<O> {
    /// Attack `oracle` with 16 byte blocks, the default retry policy and
    /// progress sent to the `log` facade.
    pub fn new(oracle: O) -> Self {
        Self {
            invoker: OracleInvoker::new(oracle, RetryPolicy::default()),
            block_size: crate::config::DEFAULT_BLOCK_SIZE,
            observer: Box::new(LogObserver),
        }
    }

    pub fn with_config(oracle: O, config: &AttackConfig) -> Result<Self> {
        Self::new(oracle)
            .with_retry_policy(config.retry)
            .with_block_size(config.block_size)
    }

    pub fn with_block_size(mut self, block_size: usize) -> Result<Self> {
        validate_block_size(block_size)?;
        self.block_size = block_size;
        Ok(self)
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.invoker.set_policy(policy);
        self
    }

    pub fn with_observer<P>(mut self, observer: P) -> Self
    where
        P: ProgressObserver + Send + Sync + 'static,
    {
        self.observer = Box::new(observer);
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.invoker.policy()
    }

    fn query(&self, ciphertext_hex: &str) -> Result<bool> {
        self.invoker.invoke(ciphertext_hex, self.observer.as_ref())
    }

    fn notify(&self, event: ProgressEvent<'_>) {
        self.observer.notify(&event);
    }
}
