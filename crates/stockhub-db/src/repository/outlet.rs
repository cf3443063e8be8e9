//! # Outlet Repository
//!
//! Outlets are plain organization-scoped rows. Deleting one cascades to its
//! ledger rows, so the admin surface only offers create and update.

use sqlx::SqlitePool;
use tracing::debug;

use crate::changes::{ChangeEvent, ChangeFeed, ChangeOp, ChangeTable};
use crate::error::{DbError, DbResult};
use stockhub_core::Outlet;

#[derive(Debug, Clone)]
pub struct OutletRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl OutletRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        OutletRepository { pool, feed }
    }

    pub async fn insert(&self, outlet: &Outlet) -> DbResult<()> {
        debug!(id = %outlet.id, name = %outlet.name, "Inserting outlet");

        sqlx::query(
            r#"
            INSERT INTO outlets (id, organization_id, name, location, table_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&outlet.id)
        .bind(&outlet.organization_id)
        .bind(&outlet.name)
        .bind(&outlet.location)
        .bind(outlet.table_count)
        .bind(outlet.created_at)
        .execute(&self.pool)
        .await?;

        self.feed.publish(ChangeEvent::new(
            ChangeTable::Outlets,
            ChangeOp::Insert,
            &outlet.organization_id,
            &outlet.id,
        ));
        Ok(())
    }

    /// All outlets of the organization, by name.
    pub async fn list(&self, organization_id: &str) -> DbResult<Vec<Outlet>> {
        let outlets = sqlx::query_as::<_, Outlet>(
            r#"
            SELECT id, organization_id, name, location, table_count, created_at
            FROM outlets
            WHERE organization_id = ?1
            ORDER BY name, id
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(outlets)
    }

    pub async fn get(&self, organization_id: &str, id: &str) -> DbResult<Outlet> {
        sqlx::query_as::<_, Outlet>(
            r#"
            SELECT id, organization_id, name, location, table_count, created_at
            FROM outlets
            WHERE organization_id = ?1 AND id = ?2
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Outlet", id))
    }

    /// Updates name, location and table count.
    pub async fn update(&self, outlet: &Outlet) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE outlets SET name = ?3, location = ?4, table_count = ?5
            WHERE organization_id = ?1 AND id = ?2
            "#,
        )
        .bind(&outlet.organization_id)
        .bind(&outlet.id)
        .bind(&outlet.name)
        .bind(&outlet.location)
        .bind(outlet.table_count)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outlet", &outlet.id));
        }

        self.feed.publish(ChangeEvent::new(
            ChangeTable::Outlets,
            ChangeOp::Update,
            &outlet.organization_id,
            &outlet.id,
        ));
        Ok(())
    }
}
