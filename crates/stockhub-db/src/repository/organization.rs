//! # Organization Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::changes::{ChangeEvent, ChangeFeed, ChangeOp, ChangeTable};
use crate::error::{DbError, DbResult};
use stockhub_core::Organization;

#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl OrganizationRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        OrganizationRepository { pool, feed }
    }

    /// Creates an organization with a fresh id.
    pub async fn create(&self, name: &str) -> DbResult<Organization> {
        let org = Organization {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO organizations (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&org.id)
            .bind(&org.name)
            .bind(org.created_at)
            .execute(&self.pool)
            .await?;

        info!(id = %org.id, name = %org.name, "Organization created");
        self.feed.publish(ChangeEvent::new(
            ChangeTable::Organizations,
            ChangeOp::Insert,
            &org.id,
            &org.id,
        ));
        Ok(org)
    }

    pub async fn get(&self, id: &str) -> DbResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, name, created_at FROM organizations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Organization", id))
    }

    /// Oldest first.
    pub async fn list(&self) -> DbResult<Vec<Organization>> {
        let orgs = sqlx::query_as::<_, Organization>(
            "SELECT id, name, created_at FROM organizations ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(orgs)
    }
}
