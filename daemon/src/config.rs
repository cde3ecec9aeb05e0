//! Simulator configuration with TOML file support.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tcr_types::{RegistryParams, TokenParams};
use tcr_utils::LogFormat;

/// Everything needed to stand up a ledger and a registry.
///
/// Can be loaded from a TOML file via [`TcrConfig::from_toml_file`]; every
/// field has a default matching the reference deployment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TcrConfig {
    #[serde(default = "default_registry_name")]
    pub registry_name: String,

    /// Ledger identity that holds registry custody.
    #[serde(default = "default_registry_account")]
    pub registry_account: String,

    /// Receives the whole token supply at genesis.
    #[serde(default = "default_genesis_holder")]
    pub genesis_holder: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub token: TokenParams,

    #[serde(default)]
    pub registry: RegistryParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_registry_name() -> String {
    "DemoTcr".to_string()
}

fn default_registry_account() -> String {
    "tcr".to_string()
}

fn default_genesis_holder() -> String {
    "genesis".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TcrConfig {
    fn default() -> Self {
        Self {
            registry_name: default_registry_name(),
            registry_account: default_registry_account(),
            genesis_holder: default_genesis_holder(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            token: TokenParams::default(),
            registry: RegistryParams::default(),
        }
    }
}

impl TcrConfig {
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid configuration")?;
        config
            .registry
            .validate()
            .context("invalid registry parameters")?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to load config file {}", path.display()))
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("failed to render configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = TcrConfig::from_toml_str("").unwrap();
        assert_eq!(config.registry_name, "DemoTcr");
        assert_eq!(config.registry.min_deposit, 100);
        assert_eq!(config.token.total_supply, 21_000_000);
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = TcrConfig::from_toml_str(
            r#"
            log_format = "json"

            [registry]
            min_deposit = 250
            voting_period_secs = 3600
            "#,
        )
        .unwrap();
        assert_eq!(config.registry.min_deposit, 250);
        assert_eq!(config.registry.voting_period_secs, 3600);
        assert_eq!(config.registry.application_period_secs, 60);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let rendered = TcrConfig::default().to_toml_string().unwrap();
        assert!(rendered.contains("total_supply = 21000000"));
        assert_eq!(TcrConfig::from_toml_str(&rendered).unwrap(), TcrConfig::default());
    }

    #[test]
    fn demo_config_loads() {
        let config = TcrConfig::from_toml_str(include_str!("../../demos/tcr.toml")).unwrap();
        assert_eq!(config, TcrConfig::default());
    }

    #[test]
    fn eighteen_decimal_amounts_round_trip() {
        let config = TcrConfig::from_toml_str(
            r#"
            [token]
            decimals = 18
            total_supply = "1000000000000000000000000000"

            [registry]
            min_deposit = "1000000000000000000000000"
            "#,
        )
        .unwrap();
        assert_eq!(config.token.total_supply, 10u128.pow(27));
        assert_eq!(config.registry.min_deposit, 10u128.pow(24));

        let again = TcrConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let err = TcrConfig::from_toml_str("[registry]\nmin_deposit = 0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("min_deposit"));
    }

    #[test]
    fn loads_from_file_and_round_trips() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "registry_name = \"Curated\"\n[token]\ntotal_supply = 500").unwrap();
        let config = TcrConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.registry_name, "Curated");
        assert_eq!(config.token.total_supply, 500);

        let rendered = config.to_toml_string().unwrap();
        let again = TcrConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(again.token, config.token);
    }
}
