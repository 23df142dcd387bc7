//! Engine configuration.
//!
//! Every field has a default, so a config file only lists what it changes.
//! Files ending in `.yaml`/`.yml` are read as YAML, everything else as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Console prompt.
    pub prompt: String,
    /// Console lines kept for `history`.
    pub history_size: usize,
    /// Shown in the console banner.
    pub app_name: Option<String>,
    /// Register the `console` command.
    pub console_enabled: bool,
    /// Register the `viewargs` command.
    pub show_view_args: bool,
    /// Resolved on empty input instead of the command list.
    pub default_command: Option<String>,
    /// Print elapsed milliseconds after each command.
    pub show_run_time: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: "$".to_string(),
            history_size: 50,
            app_name: None,
            console_enabled: false,
            show_view_args: false,
            default_command: None,
            show_run_time: false,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.prompt, "$");
        assert_eq!(c.history_size, 50);
        assert!(!c.console_enabled);
        assert!(c.default_command.is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = Config::from_json_str(r#"{"console_enabled": true, "prompt": ">"}"#).unwrap();
        assert!(c.console_enabled);
        assert_eq!(c.prompt, ">");
        assert_eq!(c.history_size, 50);
    }

    #[test]
    fn load_by_extension() {
        let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(yaml, "app_name: demo\nshow_run_time: true").unwrap();
        let c = Config::load(yaml.path()).unwrap();
        assert_eq!(c.app_name.as_deref(), Some("demo"));
        assert!(c.show_run_time);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{"default_command": "echo"}}"#).unwrap();
        let c = Config::load(json.path()).unwrap();
        assert_eq!(c.default_command.as_deref(), Some("echo"));
    }

    #[test]
    fn load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));
        assert!(matches!(
            Config::from_json_str("{not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            Config::from_yaml_str("history_size: [1, 2]"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
