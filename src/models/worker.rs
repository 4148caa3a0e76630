//! Worker model.
//!
//! Workers are the staff members whose shifts are tracked. They are
//! identified by a store-assigned [`WorkerId`] and by a unique contact handle
//! (their phone number), which is also where notifications can be sent.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Store-assigned identifier of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub i64);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique identifier of the worker.
    pub id: WorkerId,
    /// Display name.
    pub name: String,
    /// Unique contact handle (phone number).
    pub phone: String,
}

/// Data required to register a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorker {
    /// Display name.
    pub name: String,
    /// Contact handle, normalized by [`NewWorker::new`].
    pub phone: String,
}

impl NewWorker {
    /// Validates and normalizes registration data.
    ///
    /// Surrounding whitespace is trimmed from both fields and inner
    /// whitespace is removed from the phone number, so `"600 111 222"` and
    /// `"600111222"` refer to the same worker.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_ledger::models::NewWorker;
    ///
    /// let worker = NewWorker::new(" Ana ", "+34 600 111 222").unwrap();
    /// assert_eq!(worker.name, "Ana");
    /// assert_eq!(worker.phone, "+34600111222");
    /// ```
    pub fn new(name: &str, phone: &str) -> EngineResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::validation("name", "must not be empty"));
        }

        Ok(Self {
            name: name.to_string(),
            phone: normalize_phone(phone)?,
        })
    }
}

/// Normalizes a contact handle for lookups.
pub fn normalize_phone(phone: &str) -> EngineResult<String> {
    let phone: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if phone.is_empty() {
        return Err(EngineError::validation("phone", "must not be empty"));
    }

    let digits = phone.strip_prefix('+').unwrap_or(&phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(EngineError::validation(
            "phone",
            format!("'{}' is not a phone number", phone),
        ));
    }

    Ok(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_worker_trims_name() {
        let worker = NewWorker::new("  Luis  ", "600111222").unwrap();
        assert_eq!(worker.name, "Luis");
    }

    #[test]
    fn test_new_worker_rejects_blank_name() {
        let err = NewWorker::new("   ", "600111222").unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_phone_strips_inner_whitespace() {
        assert_eq!(normalize_phone("+34 600 11 12 22").unwrap(), "+34600111222");
    }

    #[test]
    fn test_phone_rejects_letters() {
        let err = normalize_phone("call-me").unwrap_err();
        assert!(matches!(err, EngineError::Validation { ref field, .. } if field == "phone"));
    }

    #[test]
    fn test_phone_rejects_lone_plus() {
        assert!(normalize_phone("+").is_err());
    }

    #[test]
    fn test_worker_id_serializes_as_number() {
        let worker = Worker {
            id: WorkerId(7),
            name: "Ana".to_string(),
            phone: "600111222".to_string(),
        };
        let json = serde_json::to_value(&worker).unwrap();
        assert_eq!(json["id"], 7);
    }
}
