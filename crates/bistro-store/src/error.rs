//! # Store Error Types
//!
//! Error types for the stateful layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  KvError (persistence)                                                 │
//! │       │  caught at the store boundary, logged as a warning             │
//! │       ▼                                                                 │
//! │  Operation degrades: returns false / None / empty                      │
//! │                                                                         │
//! │  AuthError (sign-up / login)                                           │
//! │       │  returned to the caller as a typed Result                      │
//! │       ▼                                                                 │
//! │  UI displays err.to_string() directly                                  │
//! │                                                                         │
//! │  Nothing in this crate panics on a storage failure.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use bistro_core::ValidationError;

// =============================================================================
// Persistence Error
// =============================================================================

/// Key-value persistence errors.
#[derive(Debug, Error)]
pub enum KvError {
    /// A stored value failed to serialize or a retrieved value failed to
    /// parse. A parse failure usually means the backing file was edited or
    /// truncated by hand.
    #[error("Serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// The backing file could not be read or written.
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for key-value operations.
pub type KvResult<T> = Result<T, KvError>;

// =============================================================================
// Auth Error
// =============================================================================

/// Sign-up and login failures.
///
/// Every variant's message is specific and user-displayable; the UI never
/// needs to pattern-match to build a message.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Username is already registered (case-sensitive compare).
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    /// Email is already registered (case-insensitive compare).
    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    /// Neither a username nor an email matched the identifier.
    #[error("No account found for '{0}'")]
    AccountNotFound(String),

    /// The password did not verify against the stored hash.
    #[error("Wrong password")]
    WrongPassword,

    /// Operation requires a logged-in user.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The password hash could not be derived or parsed. Indicates a
    /// corrupted stored hash rather than bad user input.
    #[error("Password hashing failed")]
    Hashing,

    /// The underlying store failed; the operation did not complete.
    #[error("Storage unavailable, try again")]
    Storage(#[from] KvError),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(
            AuthError::DuplicateUsername("alice".to_string()).to_string(),
            "Username 'alice' is already taken"
        );
        assert_eq!(
            AuthError::AccountNotFound("ghost@x.com".to_string()).to_string(),
            "No account found for 'ghost@x.com'"
        );
        assert_eq!(AuthError::WrongPassword.to_string(), "Wrong password");
    }

    #[test]
    fn test_validation_error_passes_through() {
        let err: AuthError = ValidationError::Required {
            field: "email".to_string(),
        }
        .into();
        // transparent: the inner message is the whole message
        assert_eq!(err.to_string(), "email is required");
    }
}
