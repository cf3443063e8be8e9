//! # Shared Server State
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Arc<AppState>                             │
//! │                                                                  │
//! │  db           Database (pool + change feed)     thread-safe      │
//! │  config       ServerConfig                      read-only        │
//! │  jwt          JwtManager                        read-only        │
//! │  broadcaster  Broadcaster (advisories)          thread-safe      │
//! │  terminals    TerminalRegistry                  Mutex inside     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock views are never stored here. Every request folds a fresh one from
//! the ledgers.

mod terminals;

use chrono::{FixedOffset, NaiveDate, Utc};
use stockhub_core::reconciliation::business_day;

use crate::auth::JwtManager;
use crate::broadcast::Broadcaster;
use crate::config::ServerConfig;
use stockhub_db::Database;

pub use terminals::TerminalRegistry;

pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub jwt: JwtManager,
    pub broadcaster: Broadcaster,
    pub terminals: TerminalRegistry,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let jwt = JwtManager::new(config.auth.jwt_secret.clone(), config.auth.token_lifetime_secs);
        let broadcaster = Broadcaster::with_redis_url(config.broadcast.redis_url.as_deref());
        AppState {
            db,
            config,
            jwt,
            broadcaster,
            terminals: TerminalRegistry::new(),
        }
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.config.utc_offset()
    }

    /// The organization's current business day.
    pub fn today(&self) -> NaiveDate {
        business_day(Utc::now(), self.utc_offset())
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.config.stock.low_stock_threshold
    }
}
