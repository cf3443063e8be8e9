//! # stockhub-db: Database Layer for StockHub
//!
//! SQLite persistence for the organization catalog and the three stock
//! ledgers, via sqlx. Every write is followed by a [`ChangeEvent`] on the
//! shared [`ChangeFeed`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StockHub Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (apps/server)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   stockhub-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │    │
//! │  │   │   Database    │   │  Repositories  │   │  Migrations   │   │    │
//! │  │   │   (pool.rs)   │◄──│  master_stock  │   │  (embedded)   │   │    │
//! │  │   │               │   │  distribution  │   │               │   │    │
//! │  │   │  SqlitePool   │   │  sale, ledger  │   │ 001_initial   │   │    │
//! │  │   │  ChangeFeed   │   │  menu, ...     │   │               │   │    │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockhub_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockhub.db")).await?;
//! let view = db.ledgers().stock_view(&org_id, day, offset).await;
//! ```

pub mod changes;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use changes::{ChangeEvent, ChangeFeed, ChangeOp, ChangeTable};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::distribution::{DistributionContext, DistributionRepository};
pub use repository::ledger::{LedgerRepository, LedgerSnapshot, ResetSummary};
pub use repository::master_stock::MasterStockRepository;
pub use repository::menu::MenuRepository;
pub use repository::organization::OrganizationRepository;
pub use repository::outlet::OutletRepository;
pub use repository::profile::{hash_password, verify_password, ProfileRepository};
pub use repository::sale::SaleRepository;
