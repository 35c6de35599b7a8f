//! Configuration file handling for the `tapo-cloud` binary.
//!
//! The library itself only needs a [`CloudConfig`]; the credentials and
//! the file lookup exist for the command-line front end.

pub mod schema;

pub use schema::{CloudConfig, Config, Credentials};

use anyhow::{Context, Result};
use directories::UserDirs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `account.email`.
pub const EMAIL_ENV: &str = "TAPO_EMAIL";

/// Environment variable overriding `account.password`.
pub const PASSWORD_ENV: &str = "TAPO_PASSWORD";

/// `~/.tapo-cloud/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    Ok(home.join(".tapo-cloud").join("config.toml"))
}

impl Config {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Load `path` if given, else the default location.
    ///
    /// A missing default file is not an error: the credentials may still
    /// come from the environment.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        if let Some(raw) = path {
            let expanded = shellexpand::tilde(raw);
            return Self::load(Path::new(expanded.as_ref()));
        }

        let path = default_config_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self {
                config_path: path,
                ..Self::default()
            })
        }
    }

    /// Apply `TAPO_EMAIL` / `TAPO_PASSWORD` over the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(EMAIL_ENV).ok(),
            std::env::var(PASSWORD_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, email: Option<String>, password: Option<String>) {
        if let Some(email) = email.filter(|v| !v.is_empty()) {
            self.account.email = email;
        }
        if let Some(password) = password.filter(|v| !v.is_empty()) {
            self.account.password = password;
        }
    }
}
