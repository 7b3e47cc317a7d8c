use async_trait::async_trait;
use core_logic::{
    BatchConfig, BatchScheduler, ConfigError, NetworkError, RetryConfig, RunStatistics,
};
use smashx::{
    bootstrap, validate_session, ClaimExecutor, ClaimOutcome, ClaimRequest, PlayerProfile,
    SessionInfo, SmashApi, SmashConfig, SmashError, TapRange,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn profile_with(random_coin_per_tap: u64) -> PlayerProfile {
    serde_json::from_value(serde_json::json!({
        "active_monster": {"monster": {
            "name": "Blobby",
            "coin_per_tap": 1,
            "random_coin_per_tap": random_coin_per_tap
        }},
        "balance": "1000",
        "player_level": {"level_name": "Bronze", "level_id": 1}
    }))
    .unwrap()
}

fn refused(endpoint: &str) -> NetworkError {
    NetworkError::ConnectionRefused {
        endpoint: endpoint.to_string(),
        reason: "connection reset by peer".to_string(),
    }
}

/// In-memory API. Scripted responses are consumed in call order; once a
/// script runs dry the fallback applies.
#[derive(Default)]
struct ScriptedApi {
    session: Mutex<Option<Result<SessionInfo, NetworkError>>>,
    profiles: Mutex<VecDeque<Result<u64, NetworkError>>>,
    profile_fallback: Option<u64>,
    claims: Mutex<VecDeque<Result<(), NetworkError>>>,
    profile_counter: Option<AtomicU64>,
    profile_calls: AtomicUsize,
    claim_calls: AtomicUsize,
    submitted: Mutex<Vec<ClaimRequest>>,
}

impl ScriptedApi {
    fn with_profile(coins: u64) -> Self {
        Self {
            profile_fallback: Some(coins),
            ..Default::default()
        }
    }

    fn script_profiles(self, script: Vec<Result<u64, NetworkError>>) -> Self {
        *self.profiles.lock().unwrap() = script.into();
        self
    }

    fn script_claims(self, script: Vec<Result<(), NetworkError>>) -> Self {
        *self.claims.lock().unwrap() = script.into();
        self
    }

    fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    fn claim_calls(&self) -> usize {
        self.claim_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmashApi for ScriptedApi {
    async fn session(&self) -> Result<SessionInfo, NetworkError> {
        self.session
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(SessionInfo::default()))
    }

    async fn player_profile(&self) -> Result<PlayerProfile, NetworkError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(counter) = &self.profile_counter {
            return Ok(profile_with(counter.fetch_add(1, Ordering::SeqCst)));
        }

        let scripted = self.profiles.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result.map(profile_with),
            None => self
                .profile_fallback
                .map(profile_with)
                .ok_or_else(|| refused("/api/smashx/player-profile")),
        }
    }

    async fn claim_tapping_reward(&self, claim: &ClaimRequest) -> Result<(), NetworkError> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(claim.clone());
        self.claims.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

fn executor(api: Arc<ScriptedApi>, max_attempts: u32) -> ClaimExecutor {
    ClaimExecutor::with_policy(
        api,
        Arc::new(RunStatistics::new()),
        RetryConfig::fixed(max_attempts, Duration::from_secs(1)),
        TapRange::default(),
    )
}

fn assert_counters(stats: &RunStatistics, expected: [u64; 4]) {
    assert_eq!(
        [
            stats.success(),
            stats.retry_success(),
            stats.failure(),
            stats.retry_failure()
        ],
        expected,
        "[success, retry_success, failure, retry_failure]"
    );
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success() {
    let api = Arc::new(ScriptedApi::with_profile(12));
    let executor = executor(api.clone(), 3);

    let outcome = executor.execute().await;

    assert_eq!(
        outcome,
        ClaimOutcome::Succeeded {
            attempt: 0,
            earned: 12
        }
    );
    assert_counters(executor.stats(), [1, 0, 0, 0]);
    assert_eq!(executor.stats().total_coins_earned(), 12);
    assert_eq!(api.claim_calls(), 1);

    let submitted = api.submitted.lock().unwrap();
    assert!(TapRange::default().contains(submitted[0].tap_count));
    assert_eq!(submitted[0].earned_coin_count, 12);
    assert_eq!(submitted[0].start_time, submitted[0].end_time);
}

#[tokio::test(start_paused = true)]
async fn test_fail_fail_succeed_counts_as_retry_success() {
    let api = Arc::new(ScriptedApi::with_profile(7).script_claims(vec![
        Err(refused("/api/smashx/claim-tapping-reward")),
        Err(NetworkError::HttpError {
            status_code: 500,
            endpoint: "/api/smashx/claim-tapping-reward".to_string(),
        }),
        Ok(()),
    ]));
    let executor = executor(api.clone(), 3);

    let start = tokio::time::Instant::now();
    let outcome = executor.execute().await;

    assert_eq!(
        outcome,
        ClaimOutcome::Succeeded {
            attempt: 2,
            earned: 7
        }
    );
    assert_counters(executor.stats(), [0, 1, 0, 0]);
    assert_eq!(executor.stats().total_coins_earned(), 7);
    assert_eq!(api.claim_calls(), 3);
    // Profile is re-fetched before every attempt.
    assert_eq!(api.profile_calls(), 3);
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_profile_failure_never_submits_claim() {
    let api = Arc::new(ScriptedApi::default());
    let executor = executor(api.clone(), 3);

    let outcome = executor.execute().await;

    match outcome {
        ClaimOutcome::Failed { attempts, error } => {
            assert_eq!(attempts, 3);
            assert!(matches!(error, SmashError::ProfileFetchFailed { attempts: 3, .. }));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(api.claim_calls(), 0);
    // Three claim attempts, each with three profile fetches.
    assert_eq!(api.profile_calls(), 9);
    assert_counters(executor.stats(), [0, 0, 0, 1]);
    assert_eq!(executor.stats().total_coins_earned(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_profile_recovers_within_its_own_retry() {
    let api = Arc::new(ScriptedApi::with_profile(4).script_profiles(vec![
        Err(refused("/api/smashx/player-profile")),
        Err(refused("/api/smashx/player-profile")),
    ]));
    let executor = executor(api.clone(), 3);

    let outcome = executor.execute().await;

    // The profile fetch retried internally; the claim itself succeeded first time.
    assert!(outcome.is_success());
    assert_counters(executor.stats(), [1, 0, 0, 0]);
    assert_eq!(api.profile_calls(), 3);
    assert_eq!(api.claim_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_retry_failure_uses_failure_counter() {
    let api = Arc::new(
        ScriptedApi::with_profile(5)
            .script_claims(vec![Err(refused("/api/smashx/claim-tapping-reward"))]),
    );
    let executor = executor(api.clone(), 1);

    let outcome = executor.execute().await;

    assert!(!outcome.is_success());
    assert_eq!(api.claim_calls(), 1);
    assert_counters(executor.stats(), [0, 0, 1, 0]);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_counted_like_any_failure() {
    let timeout = || NetworkError::Timeout {
        timeout_ms: 10_000,
        endpoint: "/api/smashx/claim-tapping-reward".to_string(),
    };
    let api = Arc::new(
        ScriptedApi::with_profile(5).script_claims(vec![Err(timeout()), Err(timeout()), Err(timeout())]),
    );
    let executor = executor(api.clone(), 3);

    match executor.execute().await {
        ClaimOutcome::Failed { error, .. } => assert!(error.is_timeout()),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_counters(executor.stats(), [0, 0, 0, 1]);
}

#[tokio::test(start_paused = true)]
async fn test_coins_come_from_succeeding_attempts_profile() {
    let api = Arc::new(
        ScriptedApi::with_profile(100)
            .script_profiles(vec![Ok(5), Ok(9)])
            .script_claims(vec![Err(refused("/api/smashx/claim-tapping-reward")), Ok(())]),
    );
    let executor = executor(api.clone(), 3);

    executor.execute().await;

    assert_counters(executor.stats(), [0, 1, 0, 0]);
    assert_eq!(executor.stats().total_coins_earned(), 9);
}

#[tokio::test(start_paused = true)]
async fn test_every_claim_increments_exactly_one_counter() {
    let mut claims = Vec::new();
    for i in 0..60 {
        claims.push(if i % 4 == 0 {
            Err(refused("/api/smashx/claim-tapping-reward"))
        } else {
            Ok(())
        });
    }
    let api = Arc::new(ScriptedApi::with_profile(2).script_claims(claims));
    let executor = executor(api.clone(), 3);

    for n in 1..=20u64 {
        executor.execute().await;
        assert_eq!(executor.stats().total_claims(), n);
    }

    let stats = executor.stats();
    let successes = stats.success() + stats.retry_success();
    assert_eq!(stats.total_coins_earned(), successes * 2);
}

#[tokio::test(start_paused = true)]
async fn test_batch_of_fifty_first_try_successes() {
    let api = Arc::new(ScriptedApi {
        profile_counter: Some(AtomicU64::new(1)),
        ..Default::default()
    });
    let stats = Arc::new(RunStatistics::new());
    let executor = Arc::new(ClaimExecutor::with_policy(
        api.clone(),
        stats.clone(),
        RetryConfig::fixed(3, Duration::from_secs(1)),
        TapRange::default(),
    ));
    let scheduler = BatchScheduler::new(executor, BatchConfig::default());

    let (report, summary) = scheduler
        .run_batch(1, Duration::from_millis(100), &CancellationToken::new())
        .await;

    assert_eq!(report.launched, 50);
    assert_eq!(summary.completed, 50);
    assert_counters(&stats, [50, 0, 0, 0]);
    // Each claim earned its own profile's value: 1 + 2 + ... + 50.
    assert_eq!(stats.total_coins_earned(), (1..=50).sum::<u64>());
    assert_eq!(api.claim_calls(), 50);
}

#[tokio::test]
async fn test_session_without_user_id_is_rejected_before_any_claim() {
    let api = Arc::new(ScriptedApi::with_profile(1));
    *api.session.lock().unwrap() = Some(Ok(SessionInfo::default()));

    let result = validate_session(api.as_ref()).await;

    assert!(matches!(result, Err(SmashError::SessionInvalid { .. })));
    assert_eq!(api.profile_calls(), 0);
    assert_eq!(api.claim_calls(), 0);
}

#[tokio::test]
async fn test_session_transport_error_is_session_invalid() {
    let api = Arc::new(ScriptedApi::default());
    *api.session.lock().unwrap() = Some(Err(refused("/api/auth/session")));

    let err = validate_session(api.as_ref()).await.unwrap_err();

    assert!(matches!(err, SmashError::SessionInvalid { ref reason } if reason.contains("/api/auth/session")));
}

#[tokio::test]
async fn test_valid_session_returns_info() {
    let api = Arc::new(ScriptedApi::default());
    *api.session.lock().unwrap() = Some(Ok(SessionInfo {
        user_id: Some("user-42".to_string()),
        ..Default::default()
    }));

    let info = validate_session(api.as_ref()).await.unwrap();

    assert_eq!(info.user_identifier(), Some("user-42"));
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_stops_before_any_profile_or_claim_on_bad_session() {
    let api = Arc::new(ScriptedApi::with_profile(1));
    *api.session.lock().unwrap() = Some(Ok(SessionInfo::default()));

    let result = bootstrap(api.as_ref(), RetryConfig::default()).await;

    assert!(matches!(result, Err(SmashError::SessionInvalid { .. })));
    assert_eq!(api.profile_calls(), 0);
    assert_eq!(api.claim_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_loads_banner_profile_after_valid_session() {
    let api = Arc::new(ScriptedApi::with_profile(8));
    *api.session.lock().unwrap() = Some(Ok(SessionInfo {
        user_id: Some("user-42".to_string()),
        ..Default::default()
    }));

    let startup = bootstrap(api.as_ref(), RetryConfig::default()).await.unwrap();

    assert_eq!(startup.session.user_identifier(), Some("user-42"));
    assert_eq!(startup.profile.map(|p| p.earned_coin_count()), Some(8));
    assert_eq!(api.profile_calls(), 1);
    assert_eq!(api.claim_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_tolerates_missing_banner_profile() {
    let api = Arc::new(ScriptedApi::default());
    *api.session.lock().unwrap() = Some(Ok(SessionInfo {
        user_id: Some("user-42".to_string()),
        ..Default::default()
    }));

    let startup = bootstrap(api.as_ref(), RetryConfig::default()).await.unwrap();

    assert!(startup.profile.is_none());
    assert_eq!(api.profile_calls(), 3);
}

#[test]
fn test_executor_rejects_empty_tap_range() {
    let config = SmashConfig {
        tap_count_min: 49,
        tap_count_max: 30,
        ..Default::default()
    };

    let result = ClaimExecutor::new(
        Arc::new(ScriptedApi::default()),
        Arc::new(RunStatistics::new()),
        &config,
    );

    assert!(matches!(
        result,
        Err(SmashError::Config(ConfigError::InvalidValue { .. }))
    ));
}
