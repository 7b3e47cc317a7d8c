//! Claim Executor
//!
//! One claim = fetch a fresh profile, synthesize a tap session, submit it.
//! The whole sequence is retried with a fixed delay up to `max_retries`
//! times; the profile fetch inside it has its own retry budget.
//!
//! Every call to [`ClaimExecutor::execute`] increments exactly one outcome
//! counter in [`RunStatistics`]:
//!
//! | outcome                          | counter         |
//! |----------------------------------|-----------------|
//! | accepted on the first attempt    | `success`       |
//! | accepted on a later attempt      | `retry_success` |
//! | exhausted, retries disabled      | `failure`       |
//! | exhausted after retrying         | `retry_failure` |

use crate::client::SmashApi;
use crate::config::SmashConfig;
use crate::error::SmashError;
use crate::fetcher::fetch_profile;
use crate::profile::PlayerProfile;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use core_logic::{with_retry, BatchJob, ConfigError, RetryConfig, RunStatistics};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Inclusive, non-empty range the synthetic tap count is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapRange {
    min: u32,
    max: u32,
}

impl TapRange {
    pub fn new(min: u32, max: u32) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidValue {
                field: "tap_count_min".to_string(),
                reason: format!("{} is greater than tap_count_max {}", min, max),
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, tap_count: u32) -> bool {
        (self.min..=self.max).contains(&tap_count)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

impl Default for TapRange {
    fn default() -> Self {
        Self { min: 30, max: 49 }
    }
}

/// Form body of `POST /api/smashx/claim-tapping-reward`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub tap_count: u32,
    pub earned_coin_count: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ClaimRequest {
    /// Builds a synthetic tap session: a uniformly random tap count from
    /// `tap_range`, the monster's `random_coin_per_tap` as the earned value,
    /// and both timestamps pinned to `now`.
    pub fn synthesize<R: Rng>(
        profile: &PlayerProfile,
        tap_range: TapRange,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            tap_count: tap_range.sample(rng),
            earned_coin_count: profile.earned_coin_count(),
            start_time: now,
            end_time: now,
        }
    }

    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("tapCount", self.tap_count.to_string()),
            ("earnedCoinCount", self.earned_coin_count.to_string()),
            ("startTime", iso8601(&self.start_time)),
            ("endTime", iso8601(&self.end_time)),
        ]
    }
}

fn iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Succeeded { attempt: u32, earned: u64 },
    Failed { attempts: u32, error: SmashError },
}

impl ClaimOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ClaimOutcome::Succeeded { .. })
    }
}

pub struct ClaimExecutor {
    api: Arc<dyn SmashApi>,
    stats: Arc<RunStatistics>,
    retry: RetryConfig,
    tap_range: TapRange,
}

impl ClaimExecutor {
    pub fn new(
        api: Arc<dyn SmashApi>,
        stats: Arc<RunStatistics>,
        config: &SmashConfig,
    ) -> Result<Self, SmashError> {
        let tap_range = config.tap_range()?;
        Ok(Self::with_policy(api, stats, config.retry_config(), tap_range))
    }

    pub fn with_policy(
        api: Arc<dyn SmashApi>,
        stats: Arc<RunStatistics>,
        retry: RetryConfig,
        tap_range: TapRange,
    ) -> Self {
        Self {
            api,
            stats,
            retry,
            tap_range,
        }
    }

    pub fn stats(&self) -> &Arc<RunStatistics> {
        &self.stats
    }

    async fn attempt(&self) -> Result<u64, SmashError> {
        let profile = fetch_profile(self.api.as_ref(), self.retry).await?;

        let claim = {
            let mut rng = rand::thread_rng();
            ClaimRequest::synthesize(&profile, self.tap_range, &mut rng, Utc::now())
        };

        self.api
            .claim_tapping_reward(&claim)
            .await
            .map_err(|source| SmashError::ClaimSubmitFailed { source })?;

        Ok(claim.earned_coin_count)
    }

    /// Runs one claim to a terminal state and records it. Never fails.
    pub async fn execute(&self) -> ClaimOutcome {
        let result = with_retry(self.retry, "claim-tapping-reward", |attempt| async move {
            self.attempt().await.map(|earned| (attempt, earned))
        })
        .await;

        match result {
            Ok((attempt, earned)) => {
                self.stats.record_success(attempt > 0, earned);
                debug!("Claim SUCCESS on attempt {} (+{})", attempt + 1, earned);
                ClaimOutcome::Succeeded { attempt, earned }
            }
            Err(error) => {
                self.stats.record_failure(self.retry.retries_enabled());
                debug!("Claim FAILED: {}", error);
                ClaimOutcome::Failed {
                    attempts: self.retry.max_attempts.max(1),
                    error,
                }
            }
        }
    }
}

#[async_trait]
impl BatchJob for ClaimExecutor {
    fn name(&self) -> &str {
        "claim-tapping-reward"
    }

    async fn run(&self, _slot: usize) {
        self.execute().await;
    }
}
