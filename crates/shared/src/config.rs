//! Application configuration management.

use std::collections::HashMap;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Document numbering overrides.
    #[serde(default)]
    pub numbering: NumberingConfig,
    /// Audit trail configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    ///
    /// The engine assumes a single logical writer, so this stays at 1 for SQLite.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://tallybook.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    1
}

/// Per-sequence numbering overrides, keyed by sequence name (`sale_invoice`, `cheque`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct NumberingConfig {
    /// Overrides applied when a counter is seeded for the first time.
    pub overrides: HashMap<String, SequenceOverride>,
}

impl NumberingConfig {
    /// Returns the override configured for a sequence, if any.
    #[must_use]
    pub fn get(&self, sequence: &str) -> Option<&SequenceOverride> {
        self.overrides.get(sequence)
    }
}

/// Seed override for a single sequence counter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SequenceOverride {
    /// Number prefix (e.g. "INV").
    pub prefix: Option<String>,
    /// First number handed out.
    pub start: Option<i64>,
    /// Zero-padding width.
    pub padding: Option<u32>,
}

/// Audit trail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Actor name recorded when the caller does not identify itself.
    #[serde(default = "default_actor_name")]
    pub default_actor_name: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_actor_name: default_actor_name(),
        }
    }
}

fn default_actor_name() -> String {
    "system".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLYBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        temp_env::with_vars_unset(
            ["TALLYBOOK__DATABASE__URL", "TALLYBOOK__AUDIT__DEFAULT_ACTOR_NAME"],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite://tallybook.db?mode=rwc");
                assert_eq!(config.database.max_connections, 1);
                assert_eq!(config.audit.default_actor_name, "system");
                assert!(config.numbering.get("sale_invoice").is_none());
            },
        );
    }

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("TALLYBOOK__DATABASE__URL", Some("sqlite::memory:")),
                ("TALLYBOOK__AUDIT__DEFAULT_ACTOR_NAME", Some("front-desk")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.audit.default_actor_name, "front-desk");
            },
        );
    }

    #[test]
    fn test_numbering_override_deserialize() {
        let config = config::Config::builder()
            .set_override("numbering.sale_invoice.prefix", "SI")
            .unwrap()
            .set_override("numbering.sale_invoice.start", 1)
            .unwrap()
            .build()
            .unwrap();
        let parsed: AppConfig = config.try_deserialize().unwrap();
        let sale = parsed.numbering.get("sale_invoice").unwrap();
        assert_eq!(sale.prefix.as_deref(), Some("SI"));
        assert_eq!(sale.start, Some(1));
        assert_eq!(sale.padding, None);
    }
}
