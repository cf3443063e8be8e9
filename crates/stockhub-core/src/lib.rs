//! # stockhub-core: Pure Business Logic for StockHub
//!
//! Everything that decides *what* happens to stock and sales lives here, as
//! plain functions over plain data. The database crate fetches rows, this
//! crate folds them; the server wires the two together per request.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StockHub Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Browser UI (admin hub, outlet terminals)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + SSE                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockhub-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  reconciliation  distribution  master_stock  cart  roles  report│   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockhub-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain rows (MenuItem, MasterStockEntry, DistributionEntry, ...)
//! - [`money`] - Integer minor-unit money
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`reconciliation`] - The stock view folded from the three ledgers
//! - [`distribution`] - Admin distribution batch planning
//! - [`master_stock`] - Admin master stock setup planning
//! - [`cart`] - Terminal cart and settlement state machine
//! - [`roles`] - Role capabilities
//! - [`report`] - Daily report aggregation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{FixedOffset, NaiveDate, Utc};
//! use stockhub_core::reconciliation::{LedgerSet, StockView};
//! use stockhub_core::types::{DistributionEntry, MasterStockEntry};
//! use stockhub_core::StockLevel;
//!
//! let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
//! let master = vec![MasterStockEntry::new("org", "prawn", day, 100, None)];
//! let dists = vec![
//!     DistributionEntry::new("org", "outlet-1", "prawn", day, 40, "admin", Utc::now()),
//!     DistributionEntry::new("org", "outlet-2", "prawn", day, 30, "admin", Utc::now()),
//! ];
//!
//! let ledgers = LedgerSet { master: &master, distributions: &dists, sales: &[] };
//! let view = StockView::build(day, FixedOffset::east_opt(0).unwrap(), &[], ledgers);
//!
//! assert_eq!(view.remaining_in_master("prawn"), 30);
//! assert_eq!(view.live("prawn", "outlet-1"), StockLevel::Limited(40));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod distribution;
pub mod error;
pub mod master_stock;
pub mod money;
pub mod reconciliation;
pub mod report;
pub mod roles;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconciliation::{StockLevel, StockView};
pub use roles::{Capability, Role};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// On-ground quantity at or below which settlement raises a low-stock advisory.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in a cart.
///
/// ## Business Reason
/// Prevents runaway taps on a busy terminal.
pub const MAX_ITEM_QUANTITY: i64 = 999;
