//! # stockhub-server
//!
//! HTTP API for the admin stock hub and the outlet terminals.
//!
//! The library target exposes the router and state so the scenario tests in
//! `tests/` can drive the app in-process; `main.rs` only adds config loading,
//! tracing, middleware and the listener.
//!
//! ## Request Lifecycle
//! ```text
//! Request ──► SessionContext (bearer token + stored profile)
//!         ──► capability check
//!         ──► fresh ledger fetch ──► StockView fold (stockhub-core)
//!         ──► write via stockhub-db repositories ──► ChangeFeed
//!         ──► optional Advisory broadcast
//! ```

pub mod api_types;
pub mod auth;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::SessionContext;
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::build_router;
pub use state::AppState;
