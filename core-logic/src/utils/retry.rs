use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Bounded retry policy with a constant delay between attempts.
///
/// `max_attempts` counts every call of the operation, the first one
/// included, so `max_attempts == 1` means "no retry".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(1))
    }
}

impl RetryConfig {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// True when a final failure happened after at least one retry.
    pub fn retries_enabled(&self) -> bool {
        self.max_attempts > 1
    }
}

/// Runs `operation` until it succeeds or `config.max_attempts` calls have
/// failed, sleeping [`RetryConfig::delay`] between calls.
///
/// The operation receives the zero-based attempt index. On exhaustion the
/// last error is returned unchanged.
pub async fn with_retry<T, E, F, Fut>(
    config: RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt + 1);
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt + 1 >= max_attempts {
                    debug!(
                        "{} failed after {} attempts. Last error: {}",
                        operation_name, max_attempts, e
                    );
                    return Err(e);
                }

                let delay = config.delay;
                debug!(
                    "{} failed (attempt {}/{}). Retrying in {:?}: {}",
                    operation_name,
                    attempt + 1,
                    max_attempts,
                    delay,
                    e
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_enabled() {
        assert!(RetryConfig::default().retries_enabled());
        assert!(!RetryConfig::fixed(1, Duration::from_secs(1)).retries_enabled());
    }
}
