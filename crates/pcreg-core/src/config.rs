use crate::error::{PcregError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default autosave debounce window
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 500;

/// Upper bound accepted for the debounce window (one minute)
pub const MAX_AUTOSAVE_DELAY_MS: u64 = 60_000;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    Default,
    File,
    Environment,
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Replace the value if `source` outranks the current one
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the tracker
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub autosave_delay_ms: ConfigValue<u64>,
    pub export_dir: ConfigValue<PathBuf>,
    /// Author for journal entries written from the command line; falls back
    /// to the operator name stored in the document when unset
    pub log_author: ConfigValue<Option<String>>,
}

impl LayeredConfig {
    pub fn with_defaults() -> Self {
        Self {
            autosave_delay_ms: ConfigValue::new(DEFAULT_AUTOSAVE_DELAY_MS, ConfigSource::Default),
            export_dir: ConfigValue::new(PathBuf::from("."), ConfigSource::Default),
            log_author: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| PcregError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| PcregError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(delay) = file_config.autosave_delay_ms {
            self.autosave_delay_ms.update(check_delay(delay)?, ConfigSource::File);
        }

        if let Some(dir) = file_config.export_dir {
            self.export_dir.update(dir, ConfigSource::File);
        }

        if let Some(author) = file_config.log_author.filter(|a| !a.trim().is_empty()) {
            self.log_author.update(Some(author), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load the file only if it exists
    pub fn load_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        if path.as_ref().is_file() {
            self.load_from_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(delay_str) = env::var("PCREG_AUTOSAVE_DELAY_MS") {
            match parse_autosave_delay(&delay_str) {
                Ok(delay) => self.autosave_delay_ms.update(delay, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PCREG_AUTOSAVE_DELAY_MS value '{}': expected milliseconds between 0 and {}",
                    delay_str,
                    MAX_AUTOSAVE_DELAY_MS
                ),
            }
        }

        if let Ok(dir) = env::var("PCREG_EXPORT_DIR") {
            if !dir.trim().is_empty() {
                self.export_dir.update(PathBuf::from(dir), ConfigSource::Environment);
            }
        }

        if let Ok(author) = env::var("PCREG_AUTHOR") {
            if !author.trim().is_empty() {
                self.log_author.update(Some(author), ConfigSource::Environment);
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(delay) = overrides.autosave_delay_ms {
            match check_delay(delay) {
                Ok(delay) => self.autosave_delay_ms.update(delay, ConfigSource::Cli),
                Err(e) => tracing::warn!(error = %e, "Ignoring autosave delay override"),
            }
        }

        if let Some(dir) = overrides.export_dir {
            self.export_dir.update(dir, ConfigSource::Cli);
        }

        if let Some(author) = overrides.log_author {
            self.log_author.update(Some(author), ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "autosave_delay_ms".to_string(),
            (format!("{} ms", self.autosave_delay_ms.value), self.autosave_delay_ms.source),
        );

        map.insert(
            "export_dir".to_string(),
            (self.export_dir.value.display().to_string(), self.export_dir.source),
        );

        map.insert(
            "log_author".to_string(),
            (
                self.log_author.value.clone().unwrap_or_else(|| "(operator)".to_string()),
                self.log_author.source,
            ),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    autosave_delay_ms: Option<u64>,
    export_dir: Option<PathBuf>,
    log_author: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub autosave_delay_ms: Option<u64>,
    pub export_dir: Option<PathBuf>,
    pub log_author: Option<String>,
}

/// Parse an autosave delay in milliseconds
pub fn parse_autosave_delay(s: &str) -> Result<u64> {
    let delay = s.trim().parse::<u64>().map_err(|_| PcregError::ConfigInvalid {
        key: "autosave_delay_ms".to_string(),
        reason: format!("Invalid delay: {}. Use a whole number of milliseconds", s),
    })?;
    check_delay(delay)
}

fn check_delay(delay: u64) -> Result<u64> {
    if delay > MAX_AUTOSAVE_DELAY_MS {
        return Err(PcregError::ConfigInvalid {
            key: "autosave_delay_ms".to_string(),
            reason: format!("Delay {} ms exceeds the {} ms limit", delay, MAX_AUTOSAVE_DELAY_MS),
        });
    }
    Ok(delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.autosave_delay_ms.value, 500);
        assert_eq!(config.autosave_delay_ms.source, ConfigSource::Default);
        assert_eq!(config.export_dir.value, PathBuf::from("."));
        assert!(config.log_author.value.is_none());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.source, ConfigSource::Environment);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);

        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
autosave_delay_ms = 1200
export_dir = "exports"
log_author = "Night shift"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.autosave_delay_ms.value, 1200);
        assert_eq!(config.autosave_delay_ms.source, ConfigSource::File);
        assert_eq!(config.export_dir.value, PathBuf::from("exports"));
        assert_eq!(config.log_author.value.as_deref(), Some("Night shift"));
    }

    #[test]
    fn test_file_with_out_of_range_delay_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "autosave_delay_ms = 3600000").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(PcregError::ConfigInvalid { key, .. }) if key == "autosave_delay_ms"));
    }

    #[test]
    fn test_missing_optional_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LayeredConfig::with_defaults()
            .load_optional_file(dir.path().join("config.toml"))
            .unwrap();
        assert_eq!(config.autosave_delay_ms.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            autosave_delay_ms: Some(0),
            export_dir: None,
            log_author: Some("A. Dupont".to_string()),
        });

        assert_eq!(config.autosave_delay_ms.value, 0);
        assert_eq!(config.autosave_delay_ms.source, ConfigSource::Cli);
        assert_eq!(config.log_author.source, ConfigSource::Cli);
        assert_eq!(config.export_dir.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_delay_override_is_bounded() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            autosave_delay_ms: Some(u64::MAX),
            export_dir: None,
            log_author: None,
        });

        assert_eq!(config.autosave_delay_ms.value, DEFAULT_AUTOSAVE_DELAY_MS);
        assert_eq!(config.autosave_delay_ms.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_autosave_delay() {
        assert_eq!(parse_autosave_delay("750").unwrap(), 750);
        assert_eq!(parse_autosave_delay(" 0 ").unwrap(), 0);
        assert!(parse_autosave_delay("-5").is_err());
        assert!(parse_autosave_delay("soon").is_err());
        assert!(parse_autosave_delay("60001").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let map = LayeredConfig::with_defaults().to_inspection_map();

        let (delay, source) = &map["autosave_delay_ms"];
        assert_eq!(delay, "500 ms");
        assert_eq!(*source, ConfigSource::Default);
        assert_eq!(map["log_author"].0, "(operator)");
    }
}
