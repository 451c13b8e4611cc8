//! Application Configuration
//!
//! Defaults, optional TOML file, then CLI overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::field::DEFAULT_MASK_DELAY;
use crate::i18n::Language;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration, built once and passed into the app
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub login_path: String,
    /// Anti-forgery token injected by the hosting framework
    pub csrf_token: Option<String>,
    pub mask_delay: Duration,
    pub request_timeout: Duration,
    pub language: Language,
    pub log_file: PathBuf,
    /// Skip the login screen
    pub guest: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let log_file = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("petcare-cli")
            .join("petcare.log");

        Self {
            base_url: "http://localhost:8000".to_string(),
            login_path: "/accounts/login/".to_string(),
            csrf_token: None,
            mask_delay: DEFAULT_MASK_DELAY,
            request_timeout: Duration::from_secs(10),
            language: Language::default(),
            log_file,
            guest: false,
        }
    }
}

/// On-disk shape; every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub login_path: Option<String>,
    pub csrf_token: Option<String>,
    pub mask_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub language: Option<Language>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(path: &Path, text: &str) -> ConfigResult<Self> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`; a missing file is an empty config
    pub fn load(path: &Path) -> ConfigResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("petcare-cli")
            .join("config.toml")
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.base_url {
            self.base_url = v;
        }
        if let Some(v) = file.login_path {
            self.login_path = v;
        }
        if let Some(v) = file.csrf_token {
            self.csrf_token = Some(v);
        }
        if let Some(ms) = file.mask_delay_ms {
            self.mask_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = file.language {
            self.language = v;
        }
        if let Some(v) = file.log_file {
            self.log_file = v;
        }
    }

    /// Token sent with the login form; empty when none was injected
    pub fn csrf_token(&self) -> &str {
        self.csrf_token.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub enum PendingAction {
    Logout,
    Quit,
}

impl PendingAction {
    pub fn confirm_message(&self) -> &'static str {
        match self {
            Self::Logout => "Sign out?",
            Self::Quit => "Quit Petcare?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.mask_delay, Duration::from_millis(1000));
        assert_eq!(config.csrf_token(), "");
        assert_eq!(config.language, Language::English);
    }

    #[test]
    fn test_file_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_url = "https://pets.example"
csrf_token = "abc"
mask_delay_ms = 250
language = "ja"
"#
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.apply_file(FileConfig::load(file.path()).unwrap());

        assert_eq!(config.base_url, "https://pets.example");
        assert_eq!(config.csrf_token(), "abc");
        assert_eq!(config.mask_delay, Duration::from_millis(250));
        assert_eq!(config.language, Language::Japanese);
        assert_eq!(config.login_path, "/accounts/login/");
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = FileConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.base_url.is_none());
    }

    #[test]
    fn test_bad_file_reports_path() {
        let path = Path::new("config.toml");
        let err = FileConfig::parse(path, "mask_delay_ms = \"soon\"").unwrap_err();
        assert!(err.to_string().contains("config.toml"));

        assert!(FileConfig::parse(path, "colour = \"red\"").is_err());
        assert!(FileConfig::parse(path, "language = \"klingon\"").is_err());
    }
}
