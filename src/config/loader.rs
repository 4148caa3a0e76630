//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the ledger
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

use super::types::{
    AdminSettings, EngineConfig, NotificationSettings, PayrollSettings, ServerSettings,
    StorageSettings,
};

/// Minimum length accepted for the administrative token.
pub const MIN_ADMIN_TOKEN_LEN: usize = 12;

/// Loads, validates and provides access to the ledger configuration.
///
/// # File Layout
///
/// ```text
/// payroll:
///   hourly_rate: "9.00"
///   car_allowance: "5.00"
/// notifications:
///   enabled: true
///   sender: "shift-ledger"
///   recipient: "+34600000000"   # optional
///   timeout_ms: 5000
/// storage:
///   backend: sqlite             # or memory
///   database_path: "shift_ledger.db"
/// admin:
///   token: "change-me-please"
/// server:
///   bind: "127.0.0.1:8080"
/// ```
///
/// Only `payroll.hourly_rate` and `admin.token` are required.
///
/// # Example
///
/// ```no_run
/// use shift_ledger::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/shift_ledger.yaml")?;
/// println!("Hourly rate: {}", loader.payroll().hourly_rate);
/// # Ok::<(), shift_ledger::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified YAML file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing ([`EngineError::ConfigNotFound`])
    /// - The file is not valid YAML or misses a required key
    ///   ([`EngineError::ConfigParseError`])
    /// - A value is out of range ([`EngineError::InvalidConfig`])
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml(&content, &path_str)
    }

    /// Parses configuration from YAML text.
    ///
    /// `origin` names the source in error messages.
    pub fn from_yaml(content: &str, origin: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        Self::from_config(config)
    }

    /// Wraps an already-built configuration after validating it.
    ///
    /// Surrounding whitespace is stripped from the admin token.
    pub fn from_config(mut config: EngineConfig) -> EngineResult<Self> {
        config.admin.token = config.admin.token.trim().to_string();
        Self::validate(&config)?;
        Ok(Self { config })
    }

    fn validate(config: &EngineConfig) -> EngineResult<()> {
        if config.payroll.hourly_rate < Decimal::ZERO {
            return Err(invalid("payroll.hourly_rate", "must not be negative"));
        }
        if config.payroll.car_allowance < Decimal::ZERO {
            return Err(invalid("payroll.car_allowance", "must not be negative"));
        }
        if config.notifications.timeout_ms == 0 {
            return Err(invalid("notifications.timeout_ms", "must be greater than zero"));
        }
        if config.notifications.sender.trim().is_empty() {
            return Err(invalid("notifications.sender", "must not be empty"));
        }
        if config.admin.token.len() < MIN_ADMIN_TOKEN_LEN {
            return Err(invalid(
                "admin.token",
                format!("must be at least {} characters", MIN_ADMIN_TOKEN_LEN),
            ));
        }
        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the pay parameters.
    pub fn payroll(&self) -> &PayrollSettings {
        &self.config.payroll
    }

    /// Returns the notification settings.
    pub fn notifications(&self) -> &NotificationSettings {
        &self.config.notifications
    }

    /// Returns the storage settings.
    pub fn storage(&self) -> &StorageSettings {
        &self.config.storage
    }

    /// Returns the administrative settings.
    pub fn admin(&self) -> &AdminSettings {
        &self.config.admin
    }

    /// Returns the HTTP server settings.
    pub fn server(&self) -> &ServerSettings {
        &self.config.server
    }
}

fn invalid(field: &str, message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/shift_ledger.yaml"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const MINIMAL: &str = r#"
payroll:
  hourly_rate: "9.0"
admin:
  token: "an-admin-token-of-length"
"#;

    #[test]
    fn test_load_sample_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.payroll().hourly_rate, dec("9.00"));
        assert_eq!(loader.payroll().car_allowance, dec("5.00"));
        assert_eq!(loader.storage().backend, StorageBackend::Sqlite);
    }

    #[test]
    fn test_minimal_configuration_uses_defaults() {
        let loader = ConfigLoader::from_yaml(MINIMAL, "inline").unwrap();

        assert_eq!(loader.payroll().car_allowance, Decimal::ZERO);
        assert!(loader.notifications().enabled);
        assert_eq!(loader.notifications().recipient, None);
        assert_eq!(loader.notifications().timeout_ms, 5000);
        assert_eq!(loader.server().bind, "127.0.0.1:8080");
        assert_eq!(
            loader.storage().database_path,
            std::path::PathBuf::from("shift_ledger.db")
        );
    }

    #[test]
    fn test_numeric_rate_is_accepted() {
        let yaml = MINIMAL.replace("\"9.0\"", "9.5");
        let loader = ConfigLoader::from_yaml(&yaml, "inline").unwrap();
        assert_eq!(loader.payroll().hourly_rate, dec("9.5"));
    }

    #[test]
    fn test_missing_rate_is_parse_error() {
        let yaml = r#"
payroll: {}
admin:
  token: "an-admin-token-of-length"
"#;
        match ConfigLoader::from_yaml(yaml, "inline") {
            Err(EngineError::ConfigParseError { path, message }) => {
                assert_eq!(path, "inline");
                assert!(message.contains("hourly_rate"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_rate_is_invalid() {
        let yaml = MINIMAL.replace("\"9.0\"", "\"-1\"");
        match ConfigLoader::from_yaml(&yaml, "inline") {
            Err(EngineError::InvalidConfig { field, .. }) => {
                assert_eq!(field, "payroll.hourly_rate");
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_short_admin_token_is_invalid() {
        let yaml = MINIMAL.replace("an-admin-token-of-length", "short");
        assert!(matches!(
            ConfigLoader::from_yaml(&yaml, "inline"),
            Err(EngineError::InvalidConfig { ref field, .. }) if field == "admin.token"
        ));
    }

    #[test]
    fn test_admin_token_is_trimmed() {
        let yaml = MINIMAL.replace("an-admin-token-of-length", "  spaced-admin-token  ");
        let loader = ConfigLoader::from_yaml(&yaml, "inline").unwrap();
        assert_eq!(loader.admin().token, "spaced-admin-token");
    }

    #[test]
    fn test_padded_short_admin_token_is_invalid() {
        let yaml = MINIMAL.replace("an-admin-token-of-length", "   short    ");
        assert!(matches!(
            ConfigLoader::from_yaml(&yaml, "inline"),
            Err(EngineError::InvalidConfig { ref field, .. }) if field == "admin.token"
        ));
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let yaml = format!("{}notifications:\n  timeout_ms: 0\n", MINIMAL);
        assert!(matches!(
            ConfigLoader::from_yaml(&yaml, "inline"),
            Err(EngineError::InvalidConfig { ref field, .. }) if field == "notifications.timeout_ms"
        ));
    }

    #[test]
    fn test_load_missing_file_returns_error() {
        match ConfigLoader::load("/nonexistent/shift_ledger.yaml") {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("shift_ledger.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }
}
