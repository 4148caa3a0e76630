//! Application state for the shift ledger API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use axum::http::{HeaderMap, header};

use crate::auth::AdminSession;
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::ledger::ShiftLedger;

/// Shared application state.
///
/// Holds the ledger and the configuration it was built from.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    ledger: Arc<ShiftLedger>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ConfigLoader, ledger: ShiftLedger) -> Self {
        Self {
            config: Arc::new(config),
            ledger: Arc::new(ledger),
        }
    }

    /// Returns the ledger.
    pub fn ledger(&self) -> &ShiftLedger {
        &self.ledger
    }

    /// Opens an administrative session from an `Authorization: Bearer` header.
    pub fn admin_session(&self, headers: &HeaderMap) -> EngineResult<AdminSession> {
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(EngineError::Unauthorized)?;

        AdminSession::authenticate(presented.trim(), &self.config.admin().token, "http-admin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::notify::NotificationDispatcher;
    use crate::store::MemoryStore;
    use axum::http::HeaderValue;

    fn state() -> AppState {
        state_with_token("state-test-token")
    }

    fn state_with_token(token: &str) -> AppState {
        let config = ConfigLoader::from_yaml(
            &format!(
                "payroll:\n  hourly_rate: \"9.00\"\nadmin:\n  token: \"{}\"\n",
                token
            ),
            "inline",
        )
        .unwrap();
        let ledger = ShiftLedger::new(
            Arc::new(MemoryStore::new()),
            NotificationDispatcher::disabled(),
            config.payroll().clone(),
        );
        AppState::new(config, ledger)
    }

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_bearer_token_opens_session() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer state-test-token"),
        );
        let session = state().admin_session(&headers).unwrap();
        assert_eq!(session.actor(), "http-admin");
    }

    #[test]
    fn test_missing_or_wrong_token_is_unauthorized() {
        let state = state();
        assert!(matches!(
            state.admin_session(&HeaderMap::new()),
            Err(EngineError::Unauthorized)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer wrong-token-value"),
        );
        assert!(matches!(
            state.admin_session(&headers),
            Err(EngineError::Unauthorized)
        ));
    }

    #[test]
    fn test_padded_configured_token_authenticates() {
        let state = state_with_token("  state-test-token  ");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer state-test-token"),
        );
        assert!(state.admin_session(&headers).is_ok());
    }
}
