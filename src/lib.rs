mod alphabet;
mod attack;
mod bytes;
mod config;
mod error;
pub mod http;
mod local;
mod observer;
mod oracle;
mod pkcs7;

pub use alphabet::Alphabet;
pub use attack::{DecryptedBlock, PaddingOracle};
pub use bytes::{split_blocks, xor_bytes};
pub use config::{AttackConfig, DEFAULT_BLOCK_SIZE};
pub use error::{PaddingOracleError, Result};
pub use http::HttpOracle;
pub use local::CbcPaddingOracle;
pub use observer::{LogObserver, NoopObserver, ProgressEvent, ProgressObserver};
pub use oracle::{MaxRetries, Oracle, OracleFailure, OracleInvoker, RetryPolicy};
pub use pkcs7::{pkcs7_pad, pkcs7_padding_length, pkcs7_unpad};
