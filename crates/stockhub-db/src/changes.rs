//! # Change Feed
//!
//! Repositories publish a [`ChangeEvent`] after every successful write. The
//! server forwards events to browsers over SSE, where they mean only
//! "something in this table changed, refetch".
//!
//! ```text
//! ┌──────────────────┐  publish   ┌─────────────────────────┐  subscribe
//! │ Repository write │ ─────────► │ ChangeFeed (broadcast)  │ ─────────► SSE stream
//! └──────────────────┘            └─────────────────────────┘ ─────────► tests
//! ```
//!
//! Publishing never fails: with no subscribers the event is dropped, and a
//! slow subscriber that lags simply misses events (its next refetch catches
//! up anyway).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Buffered events per subscriber before it starts lagging.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Organizations,
    Outlets,
    Profiles,
    MenuItems,
    MasterStocks,
    DailyStocks,
    Transactions,
    TransactionItems,
}

impl ChangeTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeTable::Organizations => "organizations",
            ChangeTable::Outlets => "outlets",
            ChangeTable::Profiles => "profiles",
            ChangeTable::MenuItems => "menu_items",
            ChangeTable::MasterStocks => "master_stocks",
            ChangeTable::DailyStocks => "daily_stocks",
            ChangeTable::Transactions => "transactions",
            ChangeTable::TransactionItems => "transaction_items",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub op: ChangeOp,
    pub organization_id: String,
    /// `None` for bulk operations such as a ledger reset.
    pub row_id: Option<String>,
}

impl ChangeEvent {
    pub fn new(
        table: ChangeTable,
        op: ChangeOp,
        organization_id: impl Into<String>,
        row_id: impl Into<String>,
    ) -> Self {
        ChangeEvent {
            table,
            op,
            organization_id: organization_id.into(),
            row_id: Some(row_id.into()),
        }
    }

    pub fn bulk(table: ChangeTable, op: ChangeOp, organization_id: impl Into<String>) -> Self {
        ChangeEvent {
            table,
            op,
            organization_id: organization_id.into(),
            row_id: None,
        }
    }
}

/// Cloneable publish/subscribe handle shared by every repository.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        ChangeFeed { tx }
    }

    pub fn publish(&self, event: ChangeEvent) {
        trace!(
            table = event.table.as_str(),
            op = ?event.op,
            org = %event.organization_id,
            "Publishing change"
        );
        // Err only means nobody is listening right now.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        ChangeFeed::new(DEFAULT_FEED_CAPACITY)
    }
}
