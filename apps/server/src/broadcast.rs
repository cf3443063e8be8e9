//! # Advisory Broadcasts
//!
//! Short-lived notices for terminals and the admin hub, separate from the
//! database change feed:
//!
//! - `stockAvailable` after a distribution batch writes rows for an outlet
//! - `lowStock` after a settlement leaves an item at or below the threshold
//!
//! ```text
//! handler ──► Broadcaster::publish ──► tokio broadcast ──► GET /v1/stream
//!                                  └─► Redis PUBLISH stockhub:{org}:advisory (optional)
//! ```
//!
//! Publishing is fire-and-forget. A failed Redis publish is logged and never
//! reaches the request that triggered it. The Redis connection is opened on
//! first publish and shared by every later one.

use std::fmt;
use std::sync::Arc;

use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use stockhub_core::cart::LowStockAlert;
use tokio::sync::{broadcast, OnceCell};
use tracing::{debug, warn};

pub const ADVISORY_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Advisory {
    #[serde(rename_all = "camelCase")]
    StockAvailable { outlet_id: String },
    #[serde(rename_all = "camelCase")]
    LowStock {
        outlet_id: String,
        menu_item_id: String,
        item_name: String,
        remaining: i64,
    },
}

impl Advisory {
    pub fn low_stock(outlet_id: &str, alert: LowStockAlert) -> Self {
        Advisory::LowStock {
            outlet_id: outlet_id.to_string(),
            menu_item_id: alert.menu_item_id,
            item_name: alert.item_name,
            remaining: alert.remaining,
        }
    }
}

/// An advisory and the organization it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryMessage {
    pub organization_id: String,
    #[serde(flatten)]
    pub advisory: Advisory,
}

pub fn redis_channel(organization_id: &str) -> String {
    format!("stockhub:{}:advisory", organization_id)
}

/// Redis client plus the single connection all publishes go through.
#[derive(Clone)]
struct RedisMirror {
    client: redis::Client,
    conn: Arc<OnceCell<ConnectionManager>>,
}

impl RedisMirror {
    fn new(client: redis::Client) -> Self {
        RedisMirror {
            client,
            conn: Arc::new(OnceCell::new()),
        }
    }

    /// Connects on first use. A failed connect leaves the cell empty, so the
    /// next publish tries again.
    async fn connection(&self) -> redis::RedisResult<ConnectionManager> {
        self.conn
            .get_or_try_init(|| {
                let config = ConnectionManagerConfig::new().set_number_of_retries(1);
                self.client.get_connection_manager_with_config(config)
            })
            .await
            .cloned()
    }

    async fn publish(&self, channel: &str, payload: String) -> redis::RedisResult<()> {
        let mut conn = self.connection().await?;
        conn.publish(channel, payload).await
    }
}

impl fmt::Debug for RedisMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisMirror")
            .field("client", &self.client)
            .field("connected", &self.conn.initialized())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<AdvisoryMessage>,
    redis: Option<RedisMirror>,
}

impl Broadcaster {
    pub fn new(redis: Option<redis::Client>) -> Self {
        let (tx, _) = broadcast::channel(ADVISORY_CAPACITY);
        Broadcaster {
            tx,
            redis: redis.map(RedisMirror::new),
        }
    }

    /// Opens the Redis client for `url`, continuing without a mirror when
    /// the URL is unusable.
    pub fn with_redis_url(url: Option<&str>) -> Self {
        let redis = url.and_then(|url| match redis::Client::open(url) {
            Ok(client) => {
                debug!("Advisory mirror to Redis enabled");
                Some(client)
            }
            Err(e) => {
                warn!(?e, "Failed to open Redis client, continuing without it");
                None
            }
        });
        Broadcaster::new(redis)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AdvisoryMessage> {
        self.tx.subscribe()
    }

    pub fn publish(&self, organization_id: &str, advisory: Advisory) {
        let message = AdvisoryMessage {
            organization_id: organization_id.to_string(),
            advisory,
        };
        debug!(org = %organization_id, advisory = ?message.advisory, "Publishing advisory");

        if let Some(mirror) = self.redis.clone() {
            let payload = serde_json::to_string(&message);
            let channel = redis_channel(organization_id);
            tokio::spawn(async move {
                let payload = match payload {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode advisory");
                        return;
                    }
                };
                if let Err(e) = mirror.publish(&channel, payload).await {
                    warn!(channel = %channel, error = %e, "Redis advisory publish failed");
                }
            });
        }

        // Err only means no stream is open right now.
        let _ = self.tx.send(message);
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Broadcaster::new(None)
    }
}
