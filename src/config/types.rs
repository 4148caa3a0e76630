//! Configuration types for the shift ledger.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pay parameters.
///
/// Neither value is derived from shift records; both are fixed for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollSettings {
    /// Hourly wage applied to every worked hour.
    pub hourly_rate: Decimal,
    /// Allowance assigned automatically to a shift worked with the car when
    /// the caller supplies no explicit amount.
    #[serde(default)]
    pub car_allowance: Decimal,
}

/// Outbound notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Whether ledger events are sent at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Sender identity passed to the messaging gateway.
    #[serde(default = "default_sender")]
    pub sender: String,
    /// Channel that receives every event. When absent, messages go to the
    /// worker's own phone.
    #[serde(default)]
    pub recipient: Option<String>,
    /// Upper bound for a single delivery attempt.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            sender: default_sender(),
            recipient: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_sender() -> String {
    "shift-ledger".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

/// Which store implementation backs the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite database file.
    #[default]
    Sqlite,
    /// Process-local memory; everything is lost on exit.
    Memory,
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// The store implementation.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Path of the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("shift_ledger.db")
}

/// Administrative access settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Bearer token that opens an administrative session.
    pub token: String,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// The complete configuration loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pay parameters.
    pub payroll: PayrollSettings,
    /// Notification settings.
    #[serde(default)]
    pub notifications: NotificationSettings,
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Administrative access.
    pub admin: AdminSettings,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,
}
