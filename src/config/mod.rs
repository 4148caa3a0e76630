//! Configuration loading and management for the shift ledger.
//!
//! This module loads the startup configuration from a YAML file: the hourly
//! wage and car allowance used by payroll, notification delivery settings,
//! storage location, the administrative token and the HTTP bind address.
//!
//! # Example
//!
//! ```no_run
//! use shift_ledger::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/shift_ledger.yaml").unwrap();
//! println!("Hourly rate: {}", config.payroll().hourly_rate);
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, MIN_ADMIN_TOKEN_LEN};
pub use types::{
    AdminSettings, EngineConfig, NotificationSettings, PayrollSettings, ServerSettings,
    StorageBackend, StorageSettings,
};
