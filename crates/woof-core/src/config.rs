//! woof configuration file parser.
//!
//! The file is TOML by default. A `.json` extension selects JSON, and
//! every key also accepts its PascalCase spelling (`ServerConfig`,
//! `ListenAddress`, `OnExpiry`, ...) so older JSON configurations load
//! unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration;
use crate::error::{CoreError, CoreResult};
use crate::types::TriggerKind;

/// Interval used when a watch leaves it unset or zero.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

pub const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:8080";

/// Default bound on how long a caller waits for a watch to answer.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, alias = "ServerConfig")]
    pub server: ServerConfig,
    #[serde(default, alias = "Watches")]
    pub watches: BTreeMap<String, WatchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address", alias = "ListenAddress")]
    pub listen_address: String,
    /// Where status snapshots are loaded from and written to.
    #[serde(default, alias = "StateFile", skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    /// Command prefix; a watch's `on_expiry` is appended as the last argument.
    #[serde(default = "default_exec_args", alias = "ExecArgs")]
    pub exec_args: Vec<String>,
    #[serde(
        default = "default_query_timeout",
        alias = "QueryTimeout",
        with = "duration::text"
    )]
    pub query_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            state_file: None,
            exec_args: default_exec_args(),
            query_timeout: default_query_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default, alias = "Trigger")]
    pub trigger: TriggerKind,
    #[serde(default, alias = "Interval", with = "duration::text")]
    pub interval: Duration,
    /// Shell snippet run when the watch expires.
    #[serde(default, alias = "OnExpiry", skip_serializing_if = "String::is_empty")]
    pub on_expiry: String,
}

impl WatchConfig {
    /// The configured interval, or [`DEFAULT_INTERVAL`] when unset.
    pub fn effective_interval(&self) -> Duration {
        if self.interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            self.interval
        }
    }
}

fn default_listen_address() -> String {
    DEFAULT_LISTEN_ADDRESS.to_string()
}

fn default_exec_args() -> Vec<String> {
    vec!["/bin/bash".to_string(), "-c".to_string()]
}

fn default_query_timeout() -> Duration {
    DEFAULT_QUERY_TIMEOUT
}

impl ConfigFile {
    /// Load a configuration file, picking the format from its extension.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&content).map_err(|source| CoreError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::from_toml_str(&content).map_err(|source| CoreError::Toml {
                path: path.to_path_buf(),
                source,
            })?
        };
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let config: ConfigFile = toml::from_str(content)?;
        Ok(config.normalized())
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        let config: ConfigFile = serde_json::from_str(content)?;
        Ok(config.normalized())
    }

    // An empty state file path means "no state file".
    fn normalized(mut self) -> Self {
        if self
            .server
            .state_file
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            self.server.state_file = None;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_toml_uses_defaults() {
        let toml_str = r#"
[watches.backup]
trigger = "post"
"#;
        let config = ConfigFile::from_toml_str(toml_str).unwrap();
        assert_eq!(config.server.listen_address, "127.0.0.1:8080");
        assert_eq!(config.server.exec_args, vec!["/bin/bash", "-c"]);
        assert_eq!(config.server.query_timeout, Duration::from_secs(5));
        assert!(config.server.state_file.is_none());

        let backup = &config.watches["backup"];
        assert_eq!(backup.trigger, TriggerKind::Post);
        assert_eq!(backup.interval, Duration::ZERO);
        assert_eq!(backup.effective_interval(), Duration::from_secs(30));
        assert!(backup.on_expiry.is_empty());
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[server]
listen_address = "0.0.0.0:9000"
state_file = "/var/lib/woof/state.json"
exec_args = ["/bin/sh", "-c"]
query_timeout = "2s"

[watches.nightly]
trigger = "Periodic"
interval = "24h"
on_expiry = "echo late"

[watches.button]
trigger = "sometimes"
interval = "1m30s"
"#;
        let config = ConfigFile::from_toml_str(toml_str).unwrap();
        assert_eq!(config.server.listen_address, "0.0.0.0:9000");
        assert_eq!(
            config.server.state_file,
            Some(PathBuf::from("/var/lib/woof/state.json"))
        );
        assert_eq!(config.server.query_timeout, Duration::from_secs(2));

        let nightly = &config.watches["nightly"];
        assert_eq!(nightly.trigger, TriggerKind::Periodic);
        assert_eq!(nightly.interval, Duration::from_secs(86_400));
        assert_eq!(nightly.on_expiry, "echo late");

        let button = &config.watches["button"];
        assert_eq!(button.trigger, TriggerKind::Manual);
        assert_eq!(button.effective_interval(), Duration::from_secs(90));
    }

    #[test]
    fn parse_legacy_json_layout() {
        let json = r#"{
            "ServerConfig": {"ListenAddress": ":8181", "StateFile": "", "ExecArgs": []},
            "Watches": {
                "cron": {"Trigger": "periodic", "Interval": "1h", "OnExpiry": "logger missed"},
                "api": {"Trigger": "POST", "Interval": ""}
            }
        }"#;
        let config = ConfigFile::from_json_str(json).unwrap();
        assert_eq!(config.server.listen_address, ":8181");
        assert!(config.server.state_file.is_none());
        assert!(config.server.exec_args.is_empty());
        assert_eq!(config.watches["cron"].trigger, TriggerKind::Periodic);
        assert_eq!(config.watches["cron"].on_expiry, "logger missed");
        assert_eq!(config.watches["api"].trigger, TriggerKind::Post);
        assert_eq!(config.watches["api"].effective_interval(), DEFAULT_INTERVAL);
    }

    #[test]
    fn bad_interval_is_an_error() {
        let toml_str = r#"
[watches.broken]
interval = "soon"
"#;
        assert!(ConfigFile::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn from_file_selects_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, r#"{"Watches": {"a": {"Trigger": "manual"}}}"#).unwrap();
        let config = ConfigFile::from_file(&json_path).unwrap();
        assert_eq!(config.watches["a"].trigger, TriggerKind::Manual);

        let toml_path = dir.path().join("woof.toml");
        std::fs::write(&toml_path, "[watches.b]\ntrigger = \"periodic\"\n").unwrap();
        let config = ConfigFile::from_file(&toml_path).unwrap();
        assert_eq!(config.watches["b"].trigger, TriggerKind::Periodic);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ConfigFile::from_file(Path::new("/nonexistent/woof.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/woof.toml"));
    }
}
