//! Optional TOML configuration.
//!
//! Looked up in order: an explicit `--config` path, `./lambda-emu.toml`, then
//! `<user config dir>/lambda-emu/config.toml`. Every key is optional; command
//! line flags and environment variables win over the file.
//!
//! ```toml
//! timeout = 30
//! verbose = true
//! handler_paths = ["target/debug"]
//! log_level = "lambda_emu=debug"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{EmulatorError, Result};

pub const CONFIG_FILE_NAME: &str = "lambda-emu.toml";

/// Whole-run invocation timeout, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TimeoutBudget(u64);

impl TimeoutBudget {
    pub const MIN_SECS: u64 = 1;
    /// Platform ceiling, also the default.
    pub const MAX_SECS: u64 = 300;

    pub fn new(secs: u64) -> Result<Self> {
        if (Self::MIN_SECS..=Self::MAX_SECS).contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(EmulatorError::Config(format!(
                "timeout must be between {} and {} seconds, got {}",
                Self::MIN_SECS,
                Self::MAX_SECS,
                secs
            )))
        }
    }

    pub fn secs(self) -> u64 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for TimeoutBudget {
    fn default() -> Self {
        Self(Self::MAX_SECS)
    }
}

impl TryFrom<u64> for TimeoutBudget {
    type Error = EmulatorError;

    fn try_from(secs: u64) -> Result<Self> {
        Self::new(secs)
    }
}

impl From<TimeoutBudget> for u64 {
    fn from(budget: TimeoutBudget) -> u64 {
        budget.0
    }
}

impl fmt::Display for TimeoutBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub timeout: Option<TimeoutBudget>,
    pub verbose: bool,
    pub handler_paths: Vec<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load the first configuration file found, or defaults when there is none.
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let implicit = [
            Some(PathBuf::from(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|dir| dir.join("lambda-emu").join("config.toml")),
        ];
        for path in implicit.into_iter().flatten() {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EmulatorError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&raw)
            .map_err(|e| EmulatorError::Config(format!("{}: {}", path.display(), e)))?;

        // Relative handler paths are relative to the file that names them.
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let config = Self {
            handler_paths: config
                .handler_paths
                .into_iter()
                .map(|p| if p.is_relative() { base.join(p) } else { p })
                .collect(),
            ..config
        };
        debug!(path = %path.display(), ?config, "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn parses_all_keys() {
        let config = Config::from_toml(
            r#"
            timeout = 30
            verbose = true
            handler_paths = ["/opt/handlers"]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout, Some(TimeoutBudget::new(30).unwrap()));
        assert!(config.verbose);
        assert_eq!(config.handler_paths, vec![PathBuf::from("/opt/handlers")]);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn rejects_out_of_range_timeouts() {
        assert!(Config::from_toml("timeout = 0").is_err());
        assert!(Config::from_toml("timeout = 301").is_err());
        assert!(TimeoutBudget::new(300).is_ok());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::from_toml("memory = 128").is_err());
    }

    #[test]
    fn relative_handler_paths_follow_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "handler_paths = [\"libs\"]\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.handler_paths, vec![dir.path().join("libs")]);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/no/such/lambda-emu.toml"))).unwrap_err();
        assert!(matches!(err, EmulatorError::Config(_)));
    }

    #[test]
    fn default_timeout_is_platform_ceiling() {
        assert_eq!(TimeoutBudget::default().secs(), 300);
        assert_eq!(TimeoutBudget::default().as_duration(), Duration::from_secs(300));
    }
}
