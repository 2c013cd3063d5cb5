//! # Validation Module
//!
//! Input validation for account and cart operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI forms (external)                                          │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Authoritative field rules (email shape, password strength, ...)   │
//! │  └── Runs before any mutation; a failed check changes no state         │
//! │                                                                         │
//! │  Every error renders as a specific, user-displayable message.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Account Field Validators
// =============================================================================

/// Validates a username.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Letters, digits, underscores, dots and hyphens only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(())
}

/// Validates an email address shape.
///
/// ## Rules
/// - Exactly one `@`
/// - Non-empty local part
/// - Domain with at least one dot and non-empty labels
/// - No whitespace anywhere
///
/// This is a structural check, not an RFC 5321 parser; the stores only need
/// it for duplicate detection and display, never for actual delivery.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(invalid()),
    };

    if local.is_empty() || domain.is_empty() {
        return Err(invalid());
    }

    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Err(invalid());
    }

    Ok(())
}

/// Validates password strength.
///
/// ## Rules
/// - At least `MIN_PASSWORD_LEN` (6) characters
/// - At least one letter and one digit
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: "must contain letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name.
pub fn validate_full_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "full name".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "full name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Digits only
/// - 10 or 11 digits
/// - Leading zero (national dialing format)
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "phone".to_string(),
        reason: reason.to_string(),
    };

    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("must contain digits only"));
    }

    if !(10..=11).contains(&phone.len()) {
        return Err(invalid("must be 10 or 11 digits"));
    }

    if !phone.starts_with('0') {
        return Err(invalid("must start with 0"));
    }

    Ok(())
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `MAX_ITEM_QUANTITY` (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_92").is_ok());
        assert!(validate_username("mai.nguyen").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b@mail.co.uk").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("bad-email").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("alice@nodot").is_err());
        assert!(validate_email("alice@ex..com").is_err());
        assert!(validate_email("a b@example.com").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("abc123").is_ok());
        assert!(validate_password("S3curePass").is_ok());

        assert!(validate_password("ab1").is_err()); // too short
        assert!(validate_password("abcdef").is_err()); // no digit
        assert!(validate_password("123456").is_err()); // no letter
    }

    #[test]
    fn test_validate_password_message_mentions_letters_and_digits() {
        let err = validate_password("abcdef").unwrap_err();
        assert!(err.to_string().contains("letters and digits"));
    }

    #[test]
    fn test_validate_full_name() {
        assert!(validate_full_name("Alice Nguyen").is_ok());
        assert!(validate_full_name("").is_err());
        assert!(validate_full_name("  ").is_err());
        assert!(validate_full_name(&"x".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0912345678").is_ok()); // 10 digits
        assert!(validate_phone("01234567890").is_ok()); // 11 digits

        assert!(validate_phone("").is_err());
        assert!(validate_phone("912345678").is_err()); // no leading zero
        assert!(validate_phone("0912-345-678").is_err()); // non-digits
        assert!(validate_phone("09123").is_err()); // too short
        assert!(validate_phone("091234567890").is_err()); // too long
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }
}
