use crate::client::SmashApi;
use crate::error::SmashError;
use crate::session::SessionInfo;
use tracing::{debug, error};

/// Confirms the session cookie is accepted before any claim is attempted.
///
/// One request, no retry. A transport failure or a response without a user
/// identifier both yield [`SmashError::SessionInvalid`].
pub async fn validate_session(api: &dyn SmashApi) -> Result<SessionInfo, SmashError> {
    let info = api.session().await.map_err(|e| {
        error!("Session FAILED: {}", e);
        SmashError::SessionInvalid {
            reason: e.to_string(),
        }
    })?;

    match info.user_identifier() {
        Some(user_id) => {
            debug!("Session accepted for user {}", user_id);
            Ok(info)
        }
        None => Err(SmashError::SessionInvalid {
            reason: "response carried no user identifier".to_string(),
        }),
    }
}
