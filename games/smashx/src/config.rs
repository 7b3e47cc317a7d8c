//! Configuration loader for the SmashX tapper
//!
//! Values come from an optional TOML file, then `SMASHX_*` environment
//! variables, then CLI overrides applied by the binary. Every key has a
//! default, so running without a config file is fine.

use crate::claim::TapRange;
use config::{Config, Environment, File};
use core_logic::{BatchConfig, BatchMode, ConfigError, RetryConfig};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://apps.xprotocol.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BatchModeKind {
    /// Stagger launches, wait for the batch, then pause
    Staggered,
    /// Fire a full batch on every tick, batches may overlap
    FixedInterval,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmashConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Claims launched per cycle
    #[serde(default = "default_parallel_requests")]
    pub parallel_requests: usize,
    /// Pause after a staggered batch settles
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Delay between launches inside a staggered batch
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
    /// Tick period in fixed-interval mode
    #[serde(default = "default_fixed_interval_ms")]
    pub fixed_interval_ms: u64,
    #[serde(default = "default_batch_mode")]
    pub batch_mode: BatchModeKind,
    /// Total attempts per claim and per profile fetch, first one included
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_tap_count_min")]
    pub tap_count_min: u32,
    #[serde(default = "default_tap_count_max")]
    pub tap_count_max: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_parallel_requests() -> usize {
    50
}

fn default_interval_ms() -> u64 {
    3000
}

fn default_stagger_ms() -> u64 {
    100
}

fn default_fixed_interval_ms() -> u64 {
    5000
}

fn default_batch_mode() -> BatchModeKind {
    BatchModeKind::Staggered
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_tap_count_min() -> u32 {
    30
}

fn default_tap_count_max() -> u32 {
    49
}

impl Default for SmashConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            parallel_requests: default_parallel_requests(),
            interval_ms: default_interval_ms(),
            stagger_ms: default_stagger_ms(),
            fixed_interval_ms: default_fixed_interval_ms(),
            batch_mode: default_batch_mode(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            tap_count_min: default_tap_count_min(),
            tap_count_max: default_tap_count_max(),
        }
    }
}

impl SmashConfig {
    /// Loads `path` (optional) layered under `SMASHX_*` environment variables.
    ///
    /// Not validated here: the caller applies CLI overrides first, then
    /// calls [`SmashConfig::validate`].
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("SMASHX").try_parsing(true))
            .build()
            .map_err(|e| ConfigError::LoadFailed {
                path: path.to_string(),
                msg: e.to_string(),
            })?;

        let config: SmashConfig =
            settings
                .try_deserialize()
                .map_err(|e| ConfigError::LoadFailed {
                    path: path.to_string(),
                    msg: e.to_string(),
                })?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.base_url) {
            Ok(url) if url.scheme() == "https" || url.scheme() == "http" => {}
            _ => {
                return Err(ConfigError::InvalidBaseUrl {
                    url: self.base_url.clone(),
                })
            }
        }

        if self.parallel_requests == 0 {
            return Err(invalid("parallel_requests", "must be at least 1"));
        }
        if self.max_retries == 0 {
            return Err(invalid("max_retries", "must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be at least 1"));
        }
        if self.batch_mode == BatchModeKind::FixedInterval && self.fixed_interval_ms == 0 {
            return Err(invalid("fixed_interval_ms", "must be greater than 0"));
        }
        self.tap_range()?;

        Ok(())
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn batch_config(&self) -> BatchConfig {
        let mode = match self.batch_mode {
            BatchModeKind::Staggered => BatchMode::Staggered {
                stagger: Duration::from_millis(self.stagger_ms),
                pause: Duration::from_millis(self.interval_ms),
            },
            BatchModeKind::FixedInterval => BatchMode::FixedInterval {
                period: Duration::from_millis(self.fixed_interval_ms),
            },
        };

        BatchConfig {
            batch_size: self.parallel_requests,
            mode,
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::fixed(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tap_range(&self) -> Result<TapRange, ConfigError> {
        TapRange::new(self.tap_count_min, self.tap_count_max)
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
