use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Point-in-time copy of [`RunStatistics`].
///
/// Counters are read one by one, so a snapshot taken while claims are
/// resolving may be a few increments apart across fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub timestamp: String,
    pub uptime_secs: u64,
    pub success: u64,
    pub failure: u64,
    pub retry_success: u64,
    pub retry_failure: u64,
    pub total_coins_earned: u64,
    pub total_claims: u64,
    pub success_rate: f64,
}

/// Claim counters shared by every concurrent claim task.
///
/// All counters only ever grow; there is no reset.
#[derive(Debug)]
pub struct RunStatistics {
    success: AtomicU64,
    failure: AtomicU64,
    retry_success: AtomicU64,
    retry_failure: AtomicU64,
    total_coins_earned: AtomicU64,
    start_time: Instant,
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self {
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            retry_success: AtomicU64::new(0),
            retry_failure: AtomicU64::new(0),
            total_coins_earned: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful claim worth `coins`. `retried` selects the
    /// retry-success counter.
    pub fn record_success(&self, retried: bool, coins: u64) {
        if retried {
            self.retry_success.fetch_add(1, Ordering::SeqCst);
        } else {
            self.success.fetch_add(1, Ordering::SeqCst);
        }
        self.total_coins_earned.fetch_add(coins, Ordering::SeqCst);
    }

    /// Records a claim that exhausted its attempts.
    pub fn record_failure(&self, retried: bool) {
        if retried {
            self.retry_failure.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failure.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn success(&self) -> u64 {
        self.success.load(Ordering::SeqCst)
    }

    pub fn failure(&self) -> u64 {
        self.failure.load(Ordering::SeqCst)
    }

    pub fn retry_success(&self) -> u64 {
        self.retry_success.load(Ordering::SeqCst)
    }

    pub fn retry_failure(&self) -> u64 {
        self.retry_failure.load(Ordering::SeqCst)
    }

    pub fn total_coins_earned(&self) -> u64 {
        self.total_coins_earned.load(Ordering::SeqCst)
    }

    /// Claims that reached a terminal state, successful or not.
    pub fn total_claims(&self) -> u64 {
        self.success() + self.failure() + self.retry_success() + self.retry_failure()
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let success = self.success();
        let failure = self.failure();
        let retry_success = self.retry_success();
        let retry_failure = self.retry_failure();
        let total_claims = success + failure + retry_success + retry_failure;

        StatsSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            uptime_secs: self.uptime().as_secs(),
            success,
            failure,
            retry_success,
            retry_failure,
            total_coins_earned: self.total_coins_earned(),
            total_claims,
            success_rate: if total_claims > 0 {
                (success + retry_success) as f64 / total_claims as f64 * 100.0
            } else {
                0.0
            },
        }
    }

    pub fn to_json(&self) -> String {
        let snapshot = self.snapshot();
        serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    pub async fn export_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json();
        tokio::fs::write(path, json).await
    }
}
