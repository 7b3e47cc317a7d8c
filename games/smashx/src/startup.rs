//! Startup sequence run once before the first claim cycle.

use crate::client::SmashApi;
use crate::error::SmashError;
use crate::fetcher::fetch_profile;
use crate::profile::PlayerProfile;
use crate::session::SessionInfo;
use crate::validator::validate_session;
use core_logic::{RetryConfig, RESULT_TARGET};
use tracing::{info, warn};

pub struct Startup {
    pub session: SessionInfo,
    /// Profile for the banner; `None` if it could not be loaded.
    pub profile: Option<PlayerProfile>,
}

/// Validates the session, then loads the profile for the banner.
///
/// An invalid session is returned as an error before any profile or claim
/// request goes out. A failed profile load is only a warning.
pub async fn bootstrap(api: &dyn SmashApi, retry: RetryConfig) -> Result<Startup, SmashError> {
    let session = validate_session(api).await?;
    info!(
        target: RESULT_TARGET,
        "Session SUCCESS for user {}",
        session.user_identifier().unwrap_or_default()
    );

    let profile = match fetch_profile(api, retry).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!("Could not load initial profile: {}", e);
            None
        }
    };

    Ok(Startup { session, profile })
}
