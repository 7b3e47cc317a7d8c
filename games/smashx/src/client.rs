//! HTTP access to the SmashX API.
//!
//! [`SmashApi`] is the seam between the claim engine and the network; the
//! reqwest-backed [`SmashClient`] is the production implementation.

use crate::claim::ClaimRequest;
use crate::config::SmashConfig;
use crate::profile::PlayerProfile;
use crate::session::{Session, SessionInfo};
use async_trait::async_trait;
use core_logic::{ConfigError, NetworkError};
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const SESSION_PATH: &str = "/api/auth/session";
pub const PROFILE_PATH: &str = "/api/smashx/player-profile";
pub const CLAIM_PATH: &str = "/api/smashx/claim-tapping-reward";

#[async_trait]
pub trait SmashApi: Send + Sync {
    /// `GET /api/auth/session`
    async fn session(&self) -> Result<SessionInfo, NetworkError>;

    /// `GET /api/smashx/player-profile`
    async fn player_profile(&self) -> Result<PlayerProfile, NetworkError>;

    /// `POST /api/smashx/claim-tapping-reward`; any 2xx counts as accepted.
    async fn claim_tapping_reward(&self, claim: &ClaimRequest) -> Result<(), NetworkError>;
}

pub struct SmashClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl SmashClient {
    /// Builds a client whose default headers carry the browser header set
    /// and the session cookie, so call sites never touch credentials.
    pub fn new(config: &SmashConfig, session: &Session) -> Result<Self, ConfigError> {
        let headers = session.auth_headers(config.base_url())?;

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "http_client".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            timeout: config.request_timeout(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_error(&self, e: reqwest::Error, endpoint: &str) -> NetworkError {
        if e.is_timeout() {
            NetworkError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
                endpoint: endpoint.to_string(),
            }
        } else if let Some(status) = e.status() {
            NetworkError::HttpError {
                status_code: status.as_u16(),
                endpoint: endpoint.to_string(),
            }
        } else if e.is_decode() {
            NetworkError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        } else {
            NetworkError::ConnectionRefused {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, NetworkError> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_error(e, path))?;

        let response = self.check_status(response, path)?;
        response.json::<T>().await.map_err(|e| self.map_error(e, path))
    }

    fn check_status(&self, response: Response, path: &str) -> Result<Response, NetworkError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(NetworkError::HttpError {
                status_code: status.as_u16(),
                endpoint: path.to_string(),
            })
        }
    }
}

#[async_trait]
impl SmashApi for SmashClient {
    async fn session(&self) -> Result<SessionInfo, NetworkError> {
        self.get_json(SESSION_PATH).await
    }

    async fn player_profile(&self) -> Result<PlayerProfile, NetworkError> {
        self.get_json(PROFILE_PATH).await
    }

    async fn claim_tapping_reward(&self, claim: &ClaimRequest) -> Result<(), NetworkError> {
        let form = claim
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        let response = self
            .client
            .post(self.url(CLAIM_PATH))
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_error(e, CLAIM_PATH))?;

        self.check_status(response, CLAIM_PATH)?;
        Ok(())
    }
}
