//! Blocking session client for the Tapo cloud.
//!
//! A [`CloudClient`] starts out [`Session::Anonymous`]. A successful
//! [`CloudClient::login`] moves it to [`Session::Authenticated`], after which
//! [`CloudClient::list_devices`] can be called. There is no way back: the
//! core neither logs out nor refreshes tokens.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use super::error::{CloudError, Result};
use super::signer;
use super::types::{ApiResponse, Device, DeviceListResult, LoginResult};
use crate::config::CloudConfig;

/// Account login endpoint.
pub const LOGIN_PATH: &str = "/api/v2/account/login";

/// Device list endpoint.
pub const DEVICE_LIST_PATH: &str = "/api/v2/device/list";

/// Authentication state of a [`CloudClient`].
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { token: String },
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { token } => Some(token),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Authenticated { .. } => f.write_str("Authenticated"),
        }
    }
}

/// Tapo cloud client holding one HTTP connection pool and one session.
pub struct CloudClient {
    config: CloudConfig,
    http: Client,
    login_headers: HeaderMap,
    device_list_headers: HeaderMap,
    session: Session,
}

impl CloudClient {
    /// Create a new client. No request is made until [`login`](Self::login).
    ///
    /// Fails with [`CloudError::InvalidConfig`] when a configured header
    /// value (user agent, language, platform) cannot be sent.
    pub fn new(config: CloudConfig) -> Result<Self> {
        let device_list_headers = base_headers(&config)?;
        let mut login_headers = device_list_headers.clone();
        login_headers.insert(
            header::ACCEPT_LANGUAGE,
            header_value("accept_language", &config.accept_language)?,
        );
        login_headers.insert(
            HeaderName::from_static("x-platform"),
            header_value("platform", &config.platform)?,
        );
        login_headers.insert(header::CONNECTION, HeaderValue::from_static("Keep-Alive"));

        let mut builder = Client::builder().danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self {
            config,
            http,
            login_headers,
            device_list_headers,
            session: Session::Anonymous,
        })
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.token().is_some()
    }

    // ── Login ────────────────────────────────────────────────

    /// Build the signed parameter set for a login attempt.
    ///
    /// A fresh terminal UUID and the current millisecond timestamp are
    /// generated on every call. The returned map already contains
    /// `signature`.
    pub fn login_params(&self, email: &str, password: &str) -> BTreeMap<String, String> {
        let mut params = BTreeMap::from([
            ("appType".to_string(), self.config.app_type.clone()),
            ("cloudPassword".to_string(), signer::hash_password(password)),
            ("cloudUserName".to_string(), email.to_string()),
            ("terminalUUID".to_string(), uuid::Uuid::new_v4().to_string()),
            (
                "timestamp".to_string(),
                chrono::Utc::now().timestamp_millis().to_string(),
            ),
            ("locale".to_string(), self.config.locale.clone()),
            ("platform".to_string(), self.config.platform.clone()),
            ("model".to_string(), self.config.model.clone()),
        ]);

        let signature = signer::sign(
            params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            &self.config.app_key,
        );
        params.insert("signature".to_string(), signature);
        params
    }

    /// Authenticate against the cloud and keep the returned token.
    ///
    /// On any failure the session is left as it was.
    pub fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let params = self.login_params(email, password);

        tracing::info!("Logging in to Tapo cloud as {email}");
        let response = self
            .http
            .post(self.config.endpoint(LOGIN_PATH))
            .headers(self.login_headers.clone())
            .json(&params)
            .send()
            .map_err(log_transport)?;

        let result: LoginResult = match Self::read_envelope(response) {
            Ok(result) => result,
            Err(e) => {
                if e.is_server_rejection() {
                    tracing::debug!(params = ?redacted(&params), "Rejected login parameters");
                }
                return Err(e);
            }
        };

        self.session = Session::Authenticated {
            token: result.token,
        };
        tracing::info!("Login succeeded");
        Ok(())
    }

    // ── Devices ──────────────────────────────────────────────

    /// Fetch every device registered to the logged-in account.
    ///
    /// Fails with [`CloudError::NotAuthenticated`] without touching the
    /// network when no login has succeeded yet.
    pub fn list_devices(&self) -> Result<Vec<Device>> {
        let Some(token) = self.session.token() else {
            tracing::error!("Device list requested before login");
            return Err(CloudError::NotAuthenticated);
        };

        let response = self
            .http
            .post(self.config.endpoint(DEVICE_LIST_PATH))
            .headers(self.device_list_headers.clone())
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .map_err(log_transport)?;

        let result: DeviceListResult = Self::read_envelope(response)?;
        tracing::debug!("Fetched {} devices", result.device_list.len());
        Ok(result.device_list)
    }

    // ── HTTP plumbing ────────────────────────────────────────

    pub(crate) fn login_headers(&self) -> &HeaderMap {
        &self.login_headers
    }

    pub(crate) fn device_list_headers(&self) -> &HeaderMap {
        &self.device_list_headers
    }

    /// Check the HTTP status, decode the envelope and unwrap `result`.
    fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().map_err(log_transport)?;

        if !status.is_success() {
            tracing::error!("Request failed ({status})");
            tracing::error!("Error details: {body}");
            return Err(CloudError::HttpStatus { status, body });
        }

        // Decode `result` only after the code says it is meaningful:
        // rejections may carry an empty or differently shaped `result`.
        let envelope: ApiResponse<serde_json::Value> =
            serde_json::from_str(&body).map_err(malformed)?;

        if envelope.error_code != 0 {
            let message = envelope.msg.unwrap_or_else(|| "Unknown error".to_string());
            tracing::error!("Cloud error: {message}");
            tracing::error!("Error code: {}", envelope.error_code);
            return Err(CloudError::ServerRejection {
                code: envelope.error_code,
                message,
            });
        }

        let Some(result) = envelope.result else {
            tracing::error!("Successful response without result");
            return Err(CloudError::MalformedResponse("missing result".to_string()));
        };
        serde_json::from_value(result).map_err(malformed)
    }
}

/// Headers sent on every request.
fn base_headers(config: &CloudConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("requestbyapp"),
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::USER_AGENT,
        header_value("user_agent", &config.user_agent)?,
    );
    Ok(headers)
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| CloudError::InvalidConfig(format!("{field} is not a valid header value")))
}

fn malformed(e: serde_json::Error) -> CloudError {
    tracing::error!("Invalid response body: {e}");
    CloudError::MalformedResponse(e.to_string())
}

fn log_transport(e: reqwest::Error) -> CloudError {
    tracing::error!("Request failed: {e}");
    CloudError::Transport(e)
}

/// Copy of the login parameters safe to log.
fn redacted(params: &BTreeMap<String, String>) -> BTreeMap<&str, &str> {
    params
        .iter()
        .map(|(k, v)| {
            let value = if k == "cloudPassword" { "[REDACTED]" } else { v.as_str() };
            (k.as_str(), value)
        })
        .collect()
}
