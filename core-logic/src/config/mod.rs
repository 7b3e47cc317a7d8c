use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How consecutive claim cycles are paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchMode {
    /// Launch jobs one `stagger` apart, wait for the whole batch, then sleep `pause`.
    Staggered {
        #[serde(with = "duration_ms")]
        stagger: Duration,
        #[serde(with = "duration_ms")]
        pause: Duration,
    },
    /// Launch a full batch every `period`, regardless of earlier batches.
    FixedInterval {
        #[serde(with = "duration_ms")]
        period: Duration,
    },
}

impl Default for BatchMode {
    fn default() -> Self {
        BatchMode::Staggered {
            stagger: Duration::from_millis(100),
            pause: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of jobs launched per cycle
    pub batch_size: usize,
    pub mode: BatchMode,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            mode: BatchMode::default(),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
