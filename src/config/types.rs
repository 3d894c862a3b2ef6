use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream pools in priority order (first entry is preferred)
    pub pools: Vec<PoolConfig>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub limiter: LimiterConfig,
    #[serde(default)]
    pub donate: DonateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Pool host
    pub host: String,
    /// Pool port
    pub port: u16,
    /// Pool username
    pub user: String,
    /// Pool password
    pub password: Option<String>,
}

impl PoolConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay between reconnect attempts to the same pool
    pub pause: Duration,
    /// Attempts per pool before failover advances to the next candidate
    pub retries: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log the "use pool" / "new job" lines
    pub verbose: bool,
    /// ANSI color variants for the verbose lines
    pub colors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// How long a detached mapper may stay idle before the sweeper
    /// reclaims it (default 60 seconds)
    pub idle: Duration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DonateConfig {
    /// Donation percentage. Reserved: donation scheduling is not wired up.
    pub level: u8,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(5),
            retries: 5,
        }
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|_| {
            crate::error::ConfigError::FileNotFound {
                path: path.as_ref().display().to_string(),
            }
        })?;
        let config: Config =
            toml::from_str(&content).map_err(|e| crate::error::ConfigError::InvalidFormat {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }
}
