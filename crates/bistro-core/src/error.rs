//! # Error Types
//!
//! Domain-specific error types for bistro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bistro-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bistro-store errors (separate crate)                                  │
//! │  ├── AuthError        - Sign-up / login failures                       │
//! │  └── KvError          - Persistence failures                           │
//! │                                                                         │
//! │  Every variant's Display string is safe to show to the user directly.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (username, bill id, ...)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::types::BillStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations surfaced by the domain layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Food item cannot be found in the catalog.
    #[error("Food item not found: {0}")]
    FoodNotFound(i64),

    /// Bill cannot be found within the caller's scope.
    #[error("Bill not found: {0}")]
    BillNotFound(i64),

    /// A bill may not move between the given states.
    ///
    /// Raised for backward moves, departures from terminal states, and
    /// cancellation of anything past Pending.
    #[error("Bill cannot go from {from:?} to {to:?}")]
    InvalidStatusTransition { from: BillStatus, to: BillStatus },

    /// Checkout requires at least one cart line.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet field rules. Detected before any
/// mutation, so a failed validation never leaves partial state behind.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (email shape, phone digits, weak password).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidStatusTransition {
            from: BillStatus::Delivered,
            to: BillStatus::Pending,
        };
        assert_eq!(err.to_string(), "Bill cannot go from Delivered to Pending");

        let err = CoreError::BillNotFound(7);
        assert_eq!(err.to_string(), "Bill not found: 7");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "username".to_string(),
        };
        assert_eq!(err.to_string(), "username is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
