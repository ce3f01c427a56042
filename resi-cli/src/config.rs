//! File-based configuration.
//!
//! Credentials come from, in order of precedence: command-line flags,
//! `RESI_USERNAME`/`RESI_PASSWORD`, then the config file. Base URLs are
//! only overridable through the file (staging setups).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AppError, Result};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    /// v3-style API base URL override.
    pub api_url: Option<String>,
    /// Legacy v2-style API base URL override.
    pub api_url_v2: Option<String>,
}

impl AppConfig {
    /// Default location: `<config_dir>/resictl/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("resictl").join("config.toml"))
    }

    /// Load the config file if it exists; a missing file is an empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        toml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("{} did not parse: {e}", path.display())))
    }

    /// Fold in credentials from flags/environment, which take precedence.
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        if username.is_some() {
            self.username = username;
        }
        if password.is_some() {
            self.password = password;
        }
        self
    }

    /// Both credentials, or a bad-config error naming what is missing.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) => Ok((username, password)),
            (None, _) => Err(AppError::Config(
                "no username configured (use --username, RESI_USERNAME or the config file)".into(),
            )),
            (_, None) => Err(AppError::Config(
                "no password configured (use --password, RESI_PASSWORD or the config file)".into(),
            )),
        }
    }

    /// Render for `resictl config`, with the password masked.
    pub fn show(&self) -> String {
        let mut masked = self.clone();
        if masked.password.is_some() {
            masked.password = Some("********".to_string());
        }
        toml::to_string_pretty(&masked).unwrap_or_else(|_| String::from("<unprintable>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_values() {
        let config = AppConfig {
            username: Some("file-user".into()),
            password: Some("file-pass".into()),
            ..Default::default()
        }
        .with_credentials(Some("flag-user".into()), None);

        let (username, password) = config.credentials().unwrap();
        assert_eq!(username, "flag-user");
        assert_eq!(password, "file-pass");
    }

    #[test]
    fn test_missing_credentials_are_a_config_error() {
        let err = AppConfig::default().credentials().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_show_masks_password() {
        let config = AppConfig {
            username: Some("user@example.com".into()),
            password: Some("hunter2".into()),
            ..Default::default()
        };
        let rendered = config.show();
        assert!(rendered.contains("user@example.com"));
        assert!(!rendered.contains("hunter2"));
    }
}
