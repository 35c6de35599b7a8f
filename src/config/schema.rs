use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default regional gateway of the Tapo cloud.
pub const DEFAULT_BASE_URL: &str = "https://n-euw1-wap-gw.tplinkcloud.com";

/// Shared HMAC key of the Android app, protocol version 2.0.
pub const DEFAULT_APP_KEY: &str = "Tp-Link_Kasa_Android2.0";

/// User agent of the Tapo Android app the requests present as.
pub const DEFAULT_USER_AGENT: &str = "Tapo/2.1.14 (Android, 30)";

// ── Top-level config ─────────────────────────────────────────────

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where this config was loaded from (not serialized).
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub account: Credentials,

    #[serde(default)]
    pub cloud: CloudConfig,
}

// ── Account ──────────────────────────────────────────────────────

/// Tapo account credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// ── Cloud protocol ───────────────────────────────────────────────

/// Endpoint, app identity and transport settings of the cloud client.
///
/// The defaults reproduce what the Tapo Android app sends. `app_key` is the
/// shared secret the server verifies signatures with; it is configuration
/// so it can be rotated without a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub base_url: String,
    pub app_key: String,
    pub app_type: String,
    pub locale: String,
    pub platform: String,
    pub model: String,
    pub user_agent: String,
    pub accept_language: String,
    /// Skip TLS certificate verification (the official app's gateway
    /// certificates do not always chain to public roots).
    pub accept_invalid_certs: bool,
    /// Transport timeout in seconds. `None` keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            app_key: DEFAULT_APP_KEY.into(),
            app_type: "Tapo_Android".into(),
            locale: "fr_FR".into(),
            platform: "Android".into(),
            model: "SDK_30".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            accept_language: "fr-FR".into(),
            accept_invalid_certs: false,
            timeout_secs: None,
        }
    }
}

impl CloudConfig {
    /// Defaults pointed at another gateway.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
