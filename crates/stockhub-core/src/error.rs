//! # Error Types
//!
//! Domain errors raised by the pure StockHub logic.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockhub-core (this file)                                              │
//! │  ├── CoreError        - Stock, cart and permission rule violations      │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  stockhub-db                                                            │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  apps/server                                                            │
//! │  └── ApiError         - `{ code, message }` body + HTTP status          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                   │
//! │                         DbError ────┴──► ApiError → Browser             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is a validation-class failure in the sense that it is raised
//! before anything is written: callers can show the message and let the user
//! try again without any cleanup.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Menu item id is not part of the organization's menu.
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    /// Menu item has been deactivated.
    #[error("{0} is no longer on the menu")]
    ItemInactive(String),

    /// The outlet has no stock left for this item once the cart is counted.
    ///
    /// ## User Workflow
    /// ```text
    /// Tap "Prawn Fry"
    ///      │
    ///      ▼
    /// on_ground(outlet) = 25, already in cart = 25
    ///      │
    ///      ▼
    /// OutOfStock { item: "Prawn Fry", available: 25 }
    ///      │
    ///      ▼
    /// Terminal shows: "Prawn Fry is out of stock (25 available)"
    /// ```
    #[error("{item} is out of stock ({available} available)")]
    OutOfStock { item: String, available: i64 },

    /// A distribution would push the day's global total past master stock.
    #[error("Distribution for {item} exceeds master stock: max adjustment {max_delta}")]
    DistributionExceedsMaster { item: String, max_delta: i64 },

    /// The item has no master stock row for the day.
    #[error("No master stock for {item} on this day: max adjustment 0")]
    NoMasterStock { item: String },

    /// A negative adjustment would leave the outlet holding less than nothing.
    #[error("Reduction for {item} exceeds outlet stock: max reduction {max_reduction}")]
    NegativeOutletBalance { item: String, max_reduction: i64 },

    /// The outlet has received no distribution today.
    #[error("Terminal for outlet {0} is locked until stock is distributed")]
    TerminalLocked(String),

    /// Settlement requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Remove requested for an item the cart does not hold.
    #[error("Item {0} is not in the cart")]
    ItemNotInCart(String),

    /// The terminal session cannot accept this operation right now.
    ///
    /// ## When This Occurs
    /// - Adding, removing or clearing while a settlement is in flight
    /// - Starting a second settlement before the first one finished
    #[error("Terminal session is {state}, cannot {operation}")]
    InvalidSessionState { state: String, operation: String },

    /// Cart has reached its line limit.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// A single line has reached its quantity limit.
    #[error("Quantity cannot exceed {max}")]
    QuantityTooLarge { max: i64 },

    /// The caller's role does not carry the capability.
    #[error("Not permitted: {0}")]
    Forbidden(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., a username already taken in the organization).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
