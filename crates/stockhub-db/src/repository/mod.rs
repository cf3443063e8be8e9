//! # Repository Module
//!
//! Database repository implementations for StockHub.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │  db.distributions().append(&entry)                              │
//! │       ▼                                                                 │
//! │  XxxRepository { pool, feed }                                           │
//! │       │  SQL (runtime-checked query_as + bind)                          │
//! │       ▼                                                                 │
//! │  SQLite ──► on success: feed.publish(ChangeEvent)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every query is scoped by `organization_id`. Ledger tables are never
//! updated in place except `master_stocks`, which is keyed per item per day.
//!
//! ## Available Repositories
//!
//! - [`organization::OrganizationRepository`] - Tenants
//! - [`outlet::OutletRepository`] - Outlet CRUD
//! - [`menu::MenuRepository`] - Menu catalog with soft delete
//! - [`profile::ProfileRepository`] - Users, roles, password hashes
//! - [`master_stock::MasterStockRepository`] - Daily master ledger (upsert)
//! - [`distribution::DistributionRepository`] - Append-only distribution ledger
//! - [`sale::SaleRepository`] - Append-only sales ledger
//! - [`ledger::LedgerRepository`] - Cross-ledger reads and reset

pub mod distribution;
pub mod ledger;
pub mod master_stock;
pub mod menu;
pub mod organization;
pub mod outlet;
pub mod profile;
pub mod sale;
