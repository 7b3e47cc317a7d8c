//! # Core Logic - Shared Utilities for Reward-Claim Bots
//!
//! This crate provides the target-agnostic pieces every claim bot in the
//! workspace is built from: typed errors, the bounded-retry combinator, the
//! batch scheduler, run statistics and logging setup.
//!
//! ## Modules
//!
//! - [`config`] - Batch scheduling configuration
//! - [`error`] - Typed error handling with thiserror
//! - [`scheduler`] - Batched concurrent job dispatch with graceful shutdown
//! - [`stats`] - Lock-free run statistics
//! - [`traits`] - Core trait definitions
//! - [`utils`] - Retry and logger utilities

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod error;
pub mod scheduler;
pub mod stats;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{BatchConfig, BatchMode};
pub use error::{ConfigError, NetworkError};
pub use scheduler::{BatchScheduler, CycleReport, SchedulerSummary};
pub use stats::{RunStatistics, StatsSnapshot};
pub use traits::BatchJob;

// Utils are pub(crate) - only export specific public utilities
pub use utils::{setup_logger, setup_quiet_logger, RESULT_TARGET};

// Export retry utilities for testing
pub use utils::retry::{with_retry, RetryConfig};
