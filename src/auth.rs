//! Administrative sessions.
//!
//! Administrative operations (review listing, payroll, allowance correction)
//! take an [`AdminSession`] argument. A session can only be obtained by
//! presenting the configured token to [`AdminSession::authenticate`], so
//! holding one is proof that the caller was checked.

use subtle::ConstantTimeEq;

use crate::error::{EngineError, EngineResult};

/// An authenticated administrative caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    actor: String,
}

impl AdminSession {
    /// Checks a presented token against the configured one.
    ///
    /// `actor` labels the caller in logs.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_ledger::auth::AdminSession;
    ///
    /// let session = AdminSession::authenticate("secret-token-1", "secret-token-1", "office").unwrap();
    /// assert_eq!(session.actor(), "office");
    /// assert!(AdminSession::authenticate("guess", "secret-token-1", "office").is_err());
    /// ```
    pub fn authenticate(presented: &str, expected: &str, actor: &str) -> EngineResult<Self> {
        if expected.is_empty() || !bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
            return Err(EngineError::Unauthorized);
        }

        Ok(Self {
            actor: actor.to_string(),
        })
    }

    /// The label of the authenticated caller.
    pub fn actor(&self) -> &str {
        &self.actor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_token_opens_session() {
        let session = AdminSession::authenticate("abcdefghijkl", "abcdefghijkl", "admin").unwrap();
        assert_eq!(session.actor(), "admin");
    }

    #[test]
    fn test_wrong_token_is_unauthorized() {
        let result = AdminSession::authenticate("abcdefghijkX", "abcdefghijkl", "admin");
        assert!(matches!(result, Err(EngineError::Unauthorized)));
    }

    #[test]
    fn test_prefix_token_is_unauthorized() {
        let result = AdminSession::authenticate("abcdef", "abcdefghijkl", "admin");
        assert!(matches!(result, Err(EngineError::Unauthorized)));
    }

    #[test]
    fn test_longer_token_is_unauthorized() {
        let result = AdminSession::authenticate("abcdefghijklm", "abcdefghijkl", "admin");
        assert!(matches!(result, Err(EngineError::Unauthorized)));
    }

    #[test]
    fn test_empty_expected_never_authenticates() {
        assert!(AdminSession::authenticate("", "", "admin").is_err());
    }
}
