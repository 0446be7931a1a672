use std::time::Duration;

use crate::{MaxRetries, PaddingOracleError, Result, RetryPolicy};

pub const DEFAULT_BLOCK_SIZE: usize = 16;

const BLOCK_SIZE_VAR: &str = "PADDING_ORACLE_BLOCK_SIZE";
const MAX_RETRIES_VAR: &str = "PADDING_ORACLE_MAX_RETRIES";
const RETRY_WAIT_VAR: &str = "PADDING_ORACLE_RETRY_WAIT_SECS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackConfig {
    pub block_size: usize,
    pub retry: RetryPolicy,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

impl AttackConfig {
    /// Defaults, overridden by any of `PADDING_ORACLE_BLOCK_SIZE`,
    /// `PADDING_ORACLE_MAX_RETRIES` and `PADDING_ORACLE_RETRY_WAIT_SECS`
    /// found in the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(size) = lookup(BLOCK_SIZE_VAR) {
            config.block_size = size
                .trim()
                .parse()
                .map_err(|e| invalid(BLOCK_SIZE_VAR, &size, e))?;
            validate_block_size(config.block_size)?;
        }
        if let Some(max) = lookup(MAX_RETRIES_VAR) {
            config.retry.max_retries = max
                .parse::<MaxRetries>()
                .map_err(|e| invalid(MAX_RETRIES_VAR, &max, e))?;
        }
        if let Some(wait) = lookup(RETRY_WAIT_VAR) {
            let secs: f64 = wait
                .trim()
                .parse()
                .map_err(|e| invalid(RETRY_WAIT_VAR, &wait, e))?;
            config.retry.wait = Duration::try_from_secs_f64(secs)
                .map_err(|e| invalid(RETRY_WAIT_VAR, &wait, e))?;
        }
        Ok(config)
    }
}

pub(crate) fn validate_block_size(block_size: usize) -> Result<()> {
    if (1..=u8::MAX as usize).contains(&block_size) {
        Ok(())
    } else {
        Err(PaddingOracleError::InvalidBlockSize(block_size))
    }
}

fn invalid(var: &str, value: &str, reason: impl std::fmt::Display) -> PaddingOracleError {
    PaddingOracleError::InvalidConfig(format!("{var}={value:?}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use rstest::rstest;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_original_tool() {
        let config = AttackConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.block_size, 16);
        assert_eq!(config.retry.max_retries, MaxRetries::Bounded(10));
        assert_eq!(config.retry.wait, Duration::from_secs(3));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AttackConfig::from_lookup(lookup_from(&[
            (BLOCK_SIZE_VAR, "8"),
            (MAX_RETRIES_VAR, "unbounded"),
            (RETRY_WAIT_VAR, "0.5"),
        ]))
        .unwrap();

        assert_eq!(config.block_size, 8);
        assert_eq!(config.retry.max_retries, MaxRetries::Unbounded);
        assert_eq!(config.retry.wait, Duration::from_millis(500));
    }

    #[rstest]
    #[case(BLOCK_SIZE_VAR, "0")]
    #[case(BLOCK_SIZE_VAR, "256")]
    #[case(BLOCK_SIZE_VAR, "sixteen")]
    #[case(MAX_RETRIES_VAR, "-1")]
    #[case(RETRY_WAIT_VAR, "-3")]
    fn invalid_values_are_rejected(#[case] var: &str, #[case] value: &str) {
        let config = AttackConfig::from_lookup(lookup_from(&[(var, value)]));

        assert!(matches!(
            config,
            Err(PaddingOracleError::InvalidConfig(_) | PaddingOracleError::InvalidBlockSize(_))
        ));
    }
}
