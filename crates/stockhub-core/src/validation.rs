//! # Validation Module
//!
//! Input checks run by the server before anything reaches the database.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Browser form checks (not in this workspace)                   │
//! │  Layer 2: axum JSON extraction (types)                                  │
//! │  Layer 3: THIS MODULE (business rules on field values)                  │
//! │  Layer 4: SQLite constraints (NOT NULL, UNIQUE, FOREIGN KEY)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (menu item, outlet, person, organization).
///
/// ## Rules
/// - Must not be blank
/// - At most 120 characters after trimming
///
/// ## Example
/// ```rust
/// use stockhub_core::validation::validate_name;
///
/// assert!(validate_name("name", "Prawn Fry").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > 120 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 120,
        });
    }

    Ok(())
}

/// Validates a login username.
///
/// ## Rules
/// - 3 to 40 characters
/// - Letters, digits, `.`, `-`, `_` only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if username.len() > 40 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 40,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, hyphens and underscores"
                .to_string(),
        });
    }

    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < 8 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in minor units. Zero is allowed.
///
/// ## Example
/// ```rust
/// use stockhub_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("basePriceCents", 0).is_ok());
/// assert!(validate_price_cents("dailyPriceCents", -1).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a master stock total. Zero is allowed (it deletes the row).
pub fn validate_master_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: "totalQuantity".to_string(),
        });
    }

    Ok(())
}

pub fn validate_table_count(count: i64) -> ValidationResult<()> {
    if !(0..=500).contains(&count) {
        return Err(ValidationError::OutOfRange {
            field: "tableCount".to_string(),
            min: 0,
            max: 500,
        });
    }

    Ok(())
}

/// Validates a UTC offset in minutes (UTC-12:00 to UTC+14:00).
pub fn validate_utc_offset_minutes(minutes: i32) -> ValidationResult<()> {
    if !(-720..=840).contains(&minutes) {
        return Err(ValidationError::OutOfRange {
            field: "utc_offset_minutes".to_string(),
            min: -720,
            max: 840,
        });
    }

    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Parses a `YYYY-MM-DD` business day.
pub fn parse_business_day(value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
