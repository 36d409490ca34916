//! Engine configuration with TOML file support.

use quorum_types::Principal;
use quorum_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::beneficiaries;
use crate::QuorumError;

/// Configuration for a quorum engine instance.
///
/// Can be loaded from a TOML file via [`EngineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Genesis beneficiaries, in voting order.
    pub beneficiaries: Vec<Principal>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, QuorumError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| QuorumError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, QuorumError> {
        let config: Self = toml::from_str(s).map_err(|e| QuorumError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, QuorumError> {
        toml::to_string_pretty(self).map_err(|e| QuorumError::Config(e.to_string()))
    }

    /// Check the genesis beneficiary list with the same rules as a transfer.
    pub fn validate(&self) -> Result<(), QuorumError> {
        beneficiaries::validate(&self.beneficiaries)
            .map_err(|e| QuorumError::Config(format!("beneficiaries: {e}")))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            beneficiaries: Vec::new(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn wallet(n: u8) -> Principal {
        Principal::new([n; 20])
    }

    #[test]
    fn parse_minimal() {
        let toml = format!("beneficiaries = [\"{}\"]\n", wallet(1));
        let config = EngineConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.beneficiaries, vec![wallet(1)]);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn parse_full() {
        let toml = format!(
            "beneficiaries = [\"{}\", \"{}\"]\nlog_format = \"json\"\nlog_level = \"debug\"\n",
            wallet(1),
            wallet(2)
        );
        let config = EngineConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.beneficiaries.len(), 2);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_beneficiaries_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("log_level = \"info\"\n"),
            Err(QuorumError::Config(_))
        ));
    }

    #[test]
    fn invalid_genesis_rejected() {
        let toml = format!("beneficiaries = [\"{}\", \"{}\"]\n", wallet(1), wallet(1));
        let err = EngineConfig::from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn malformed_principal_rejected() {
        assert!(EngineConfig::from_toml_str("beneficiaries = [\"0x12\"]\n").is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let config = EngineConfig {
            beneficiaries: vec![wallet(3), wallet(4)],
            log_format: LogFormat::Json,
            log_level: "warn".into(),
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "beneficiaries = [\"{}\"]", wallet(7)).unwrap();
        let config = EngineConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.beneficiaries, vec![wallet(7)]);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EngineConfig::from_toml_file(dir.path().join("absent.toml")),
            Err(QuorumError::Config(_))
        ));
    }
}
