use std::time::Duration;

use crate::config::types::Config;
use crate::error::{ConfigError, Result};

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.pools.is_empty() {
            return Err(ConfigError::NoPools.into());
        }

        for pool in &self.pools {
            if pool.host.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "pools.host".to_string(),
                }
                .into());
            }

            if pool.port == 0 {
                return Err(ConfigError::InvalidPort { port: pool.port }.into());
            }

            if pool.user.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "pools.user".to_string(),
                }
                .into());
            }
        }

        if self.retry.pause == Duration::ZERO {
            return Err(ConfigError::InvalidDuration {
                field: "retry.pause".to_string(),
                duration: self.retry.pause,
            }
            .into());
        }

        if self.limiter.idle == Duration::ZERO {
            return Err(ConfigError::InvalidDuration {
                field: "limiter.idle".to_string(),
                duration: self.limiter.idle,
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LimiterConfig, PoolConfig, RetryConfig};
    use crate::error::StratumError;

    fn pool(host: &str, port: u16) -> PoolConfig {
        PoolConfig {
            host: host.to_string(),
            port,
            user: "wallet.worker".to_string(),
            password: None,
        }
    }

    fn config(pools: Vec<PoolConfig>) -> Config {
        Config {
            pools,
            retry: RetryConfig::default(),
            log: Default::default(),
            limiter: LimiterConfig::default(),
            donate: Default::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config(vec![pool("pool.example.com", 3333)]).validate().is_ok());
    }

    #[test]
    fn test_empty_pool_list_rejected() {
        let err = config(vec![]).validate().unwrap_err();
        assert!(matches!(
            err,
            StratumError::Config(ConfigError::NoPools)
        ));
    }

    #[test]
    fn test_zero_port_rejected() {
        let err = config(vec![pool("pool.example.com", 0)]).validate().unwrap_err();
        assert!(matches!(
            err,
            StratumError::Config(ConfigError::InvalidPort { port: 0 })
        ));
    }

    #[test]
    fn test_zero_retry_pause_rejected() {
        let mut cfg = config(vec![pool("pool.example.com", 3333)]);
        cfg.retry.pause = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_blank_user_rejected() {
        let mut cfg = config(vec![pool("pool.example.com", 3333)]);
        cfg.pools[0].user = "  ".to_string();
        assert!(cfg.validate().is_err());
    }
}
