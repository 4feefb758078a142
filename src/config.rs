use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;

pub const FOCUSED_REFRESH_MS: u64 = 10_000;
pub const UNFOCUSED_REFRESH_MS: u64 = 90_000;
const DEFAULT_MAX_CONCURRENT_SCANS: usize = 8;

const CONFIG_ENV_VAR: &str = "NANOFILER_CONFIG";
const CONFIG_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub focused_refresh_ms: u64,
    pub unfocused_refresh_ms: u64,
    pub max_concurrent_scans: usize,
    pub dedupe_in_flight: bool,
    pub sort_entries: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            focused_refresh_ms: FOCUSED_REFRESH_MS,
            unfocused_refresh_ms: UNFOCUSED_REFRESH_MS,
            max_concurrent_scans: DEFAULT_MAX_CONCURRENT_SCANS,
            dedupe_in_flight: false,
            sort_entries: false,
        }
    }
}

impl BrowserConfig {
    /// Loads settings from `$NANOFILER_CONFIG`, falling back to the platform
    /// config directory. A missing file means defaults.
    pub fn load() -> Result<Self, AppError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        log::debug!("loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.focused_refresh_ms == 0 || self.unfocused_refresh_ms == 0 {
            return Err(AppError::General(
                "refresh intervals must be greater than zero".to_string(),
            ));
        }
        if self.max_concurrent_scans == 0 {
            return Err(AppError::General(
                "max_concurrent_scans must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            focused: Duration::from_millis(self.focused_refresh_ms),
            unfocused: Duration::from_millis(self.unfocused_refresh_ms),
        }
    }
}

/// How long the live refresh waits, depending on window focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub focused: Duration,
    pub unfocused: Duration,
}

impl RefreshPolicy {
    pub fn interval(&self, is_focused: bool) -> Duration {
        if is_focused {
            self.focused
        } else {
            self.unfocused
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        BrowserConfig::default().refresh_policy()
    }
}

fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    directories::ProjectDirs::from("", "", "nanofiler")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_live_refresh_cadence() {
        let policy = RefreshPolicy::default();
        assert_eq!(policy.interval(true), Duration::from_millis(10_000));
        assert_eq!(policy.interval(false), Duration::from_millis(90_000));
        assert!(!BrowserConfig::default().dedupe_in_flight);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = BrowserConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, BrowserConfig::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "sort_entries": true, "max_concurrent_scans": 2 }"#).unwrap();

        let config = BrowserConfig::load_from(&path).unwrap();
        assert!(config.sort_entries);
        assert_eq!(config.max_concurrent_scans, 2);
        assert_eq!(config.focused_refresh_ms, FOCUSED_REFRESH_MS);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            BrowserConfig::load_from(&path),
            Err(AppError::Serde(_))
        ));
    }

    #[test]
    fn zero_values_are_rejected() {
        let config = BrowserConfig {
            focused_refresh_ms: 0,
            ..BrowserConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BrowserConfig {
            max_concurrent_scans: 0,
            ..BrowserConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
