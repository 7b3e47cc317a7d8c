//! Session credentials and the request header set built from them.

use core_logic::ConfigError;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, ORIGIN, REFERER,
    USER_AGENT,
};
use serde::Deserialize;
use std::env;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const SESSION_TOKEN_VAR: &str = "SESSION_TOKEN";
pub const CSRF_TOKEN_VAR: &str = "CSRF_TOKEN";

const CSRF_COOKIE: &str = "__Secure-authjs.csrf-token";
const SESSION_COOKIE: &str = "__Secure-authjs.session-token";

const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1";
const SEC_CH_UA: &str = r#""iPhone";v="16", "Not=A?Brand";v="8", "WebKit";v="537.36""#;

/// Auth.js session credentials. Immutable once loaded, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Session {
    session_token: String,
    csrf_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_token", &"<redacted>")
            .field("csrf_token", &"<redacted>")
            .finish()
    }
}

impl Session {
    pub fn new(session_token: impl Into<String>, csrf_token: impl Into<String>) -> Self {
        Self {
            session_token: session_token.into(),
            csrf_token: csrf_token.into(),
        }
    }

    /// Reads `SESSION_TOKEN` and `CSRF_TOKEN`. Empty values count as missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let read = |key: &str| {
            env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingField {
                    field: key.to_string(),
                })
        };

        Ok(Self::new(read(SESSION_TOKEN_VAR)?, read(CSRF_TOKEN_VAR)?))
    }

    pub fn cookie(&self) -> String {
        format!(
            "{}={}; {}={}",
            CSRF_COOKIE, self.csrf_token, SESSION_COOKIE, self.session_token
        )
    }

    /// Full header set for every request: the mobile browser headers plus
    /// the session cookie, marked sensitive so it never shows in debug output.
    pub fn auth_headers(&self, base_url: &str) -> Result<HeaderMap, ConfigError> {
        let mut headers = browser_headers(base_url)?;

        let mut cookie =
            HeaderValue::from_str(&self.cookie()).map_err(|_| ConfigError::InvalidValue {
                field: SESSION_TOKEN_VAR.to_string(),
                reason: "token contains characters not allowed in a cookie".to_string(),
            })?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);

        Ok(headers)
    }
}

fn browser_headers(base_url: &str) -> Result<HeaderMap, ConfigError> {
    let invalid_url = || ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
    };
    let url = url::Url::parse(base_url).map_err(|_| invalid_url())?;
    let authority = url.host_str().ok_or_else(invalid_url)?;
    let origin = base_url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("authority"),
        HeaderValue::from_str(authority).map_err(|_| invalid_url())?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(
        ORIGIN,
        HeaderValue::from_str(origin).map_err(|_| invalid_url())?,
    );
    headers.insert(
        REFERER,
        HeaderValue::from_str(&format!("{}/smashx", origin)).map_err(|_| invalid_url())?,
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(SEC_CH_UA),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static("\"iOS\""),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(MOBILE_USER_AGENT));

    Ok(headers)
}

/// Body of `GET /api/auth/session`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub user: Option<SessionUser>,
    pub expires: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionUser {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl SessionInfo {
    /// `userId`, falling back to `user.id`. Blank identifiers count as absent.
    pub fn user_identifier(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(|u| u.id.as_deref()))
            .filter(|id| !id.trim().is_empty())
    }
}
