//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use wardpass_types::{params, PassParams};

use crate::NodeError;

/// Configuration for a wardpass node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). The signing secret is
/// deliberately not part of this struct: it is loaded from the environment
/// at startup and never written to disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the LMDB credential store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Seconds from issuance until identity and token expire.
    #[serde(default = "default_validity_window")]
    pub validity_window_secs: u64,

    /// Seconds between expiry sweep runs.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Transactional-mail API endpoint. When unset, the sweep uses a
    /// log-only notification sink.
    #[serde(default)]
    pub mail_api_url: Option<String>,

    /// Sender address for expiry notices.
    #[serde(default)]
    pub mail_sender: Option<String>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./wardpass_data")
}

fn default_validity_window() -> u64 {
    params::DEFAULT_VALIDITY_WINDOW_SECS
}

fn default_sweep_interval() -> u64 {
    params::DEFAULT_SWEEP_INTERVAL_SECS
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }

    /// The lifecycle parameters carried by this config.
    pub fn params(&self) -> PassParams {
        PassParams {
            validity_window_secs: self.validity_window_secs,
            sweep_interval_secs: self.sweep_interval_secs,
        }
    }

    /// Whether an HTTP mailer is fully configured (API key is checked
    /// separately at startup, from the environment).
    pub fn mailer_configured(&self) -> bool {
        self.mail_api_url.as_deref().is_some_and(|s| !s.is_empty())
            && self.mail_sender.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            validity_window_secs: default_validity_window(),
            sweep_interval_secs: default_sweep_interval(),
            mail_api_url: None,
            mail_sender: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_two_days_and_hourly() {
        let cfg = NodeConfig::default();
        assert_eq!(cfg.validity_window_secs, 172_800);
        assert_eq!(cfg.sweep_interval_secs, 3_600);
        assert!(!cfg.mailer_configured());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg = NodeConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.data_dir, PathBuf::from("./wardpass_data"));
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg = NodeConfig::from_toml_str(
            r#"
            sweep_interval_secs = 300
            mail_api_url = "https://api.brevo.com/v3/smtp/email"
            mail_sender = "ops@hq.example"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.sweep_interval_secs, 300);
        assert_eq!(cfg.validity_window_secs, 172_800);
        assert!(cfg.mailer_configured());
    }

    #[test]
    fn roundtrips_through_toml() {
        let cfg = NodeConfig::default();
        let parsed = NodeConfig::from_toml_str(&cfg.to_toml_string()).unwrap();
        assert_eq!(parsed.sweep_interval_secs, cfg.sweep_interval_secs);
        assert_eq!(parsed.data_dir, cfg.data_dir);
    }

    #[test]
    fn garbage_toml_is_a_config_error() {
        assert!(matches!(
            NodeConfig::from_toml_str("sweep_interval_secs = \"soon\""),
            Err(NodeError::Config(_))
        ));
    }
}
