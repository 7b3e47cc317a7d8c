use crate::client::SmashApi;
use crate::error::SmashError;
use crate::profile::PlayerProfile;
use core_logic::{with_retry, RetryConfig};

/// Fetches a fresh player profile, retrying with a fixed delay.
///
/// Never cached: every claim attempt calls this so boost or monster changes
/// on the server are picked up immediately.
pub async fn fetch_profile(
    api: &dyn SmashApi,
    retry: RetryConfig,
) -> Result<PlayerProfile, SmashError> {
    with_retry(retry, "player-profile", |_| api.player_profile())
        .await
        .map_err(|source| SmashError::ProfileFetchFailed {
            attempts: retry.max_attempts.max(1),
            source,
        })
}
