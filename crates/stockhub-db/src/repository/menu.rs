//! # Menu Repository
//!
//! The organization's shared menu. Items are never hard-deleted because
//! historical sale lines reference them; `deactivate` flips `is_active`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::changes::{ChangeEvent, ChangeFeed, ChangeOp, ChangeTable};
use crate::error::{DbError, DbResult};
use stockhub_core::MenuItem;

const MENU_COLUMNS: &str = r#"
    id, organization_id, name, category, unit, base_price_cents,
    is_market_priced, requires_daily_stock, is_active, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl MenuRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        MenuRepository { pool, feed }
    }

    pub async fn insert(&self, item: &MenuItem) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, organization_id, name, category, unit, base_price_cents,
                is_market_priced, requires_daily_stock, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.organization_id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(&item.unit)
        .bind(item.base_price_cents)
        .bind(item.is_market_priced)
        .bind(item.requires_daily_stock)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        self.publish(ChangeOp::Insert, item);
        Ok(())
    }

    /// Menu sorted by category then name.
    pub async fn list(&self, organization_id: &str, include_inactive: bool) -> DbResult<Vec<MenuItem>> {
        let sql = format!(
            "SELECT {MENU_COLUMNS} FROM menu_items
             WHERE organization_id = ?1 AND (?2 OR is_active = 1)
             ORDER BY category, name, id"
        );
        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(organization_id)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn get(&self, organization_id: &str, id: &str) -> DbResult<MenuItem> {
        let sql = format!(
            "SELECT {MENU_COLUMNS} FROM menu_items WHERE organization_id = ?1 AND id = ?2"
        );
        sqlx::query_as::<_, MenuItem>(&sql)
            .bind(organization_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Menu item", id))
    }

    /// Overwrites the editable fields and bumps `updated_at`.
    pub async fn update(&self, item: &MenuItem) -> DbResult<MenuItem> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE menu_items SET
                name = ?3,
                category = ?4,
                unit = ?5,
                base_price_cents = ?6,
                is_market_priced = ?7,
                requires_daily_stock = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE organization_id = ?1 AND id = ?2
            "#,
        )
        .bind(&item.organization_id)
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(&item.unit)
        .bind(item.base_price_cents)
        .bind(item.is_market_priced)
        .bind(item.requires_daily_stock)
        .bind(item.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", &item.id));
        }

        let updated = MenuItem {
            updated_at: now,
            ..item.clone()
        };
        self.publish(ChangeOp::Update, &updated);
        Ok(updated)
    }

    /// Soft delete. Idempotent.
    pub async fn deactivate(&self, organization_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE menu_items SET is_active = 0, updated_at = ?3
             WHERE organization_id = ?1 AND id = ?2",
        )
        .bind(organization_id)
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", id));
        }

        self.feed.publish(ChangeEvent::new(
            ChangeTable::MenuItems,
            ChangeOp::Update,
            organization_id,
            id,
        ));
        Ok(())
    }

    fn publish(&self, op: ChangeOp, item: &MenuItem) {
        self.feed.publish(ChangeEvent::new(
            ChangeTable::MenuItems,
            op,
            &item.organization_id,
            &item.id,
        ));
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::{add_menu_item, fixture};

    #[tokio::test]
    async fn test_insert_and_list() {
        let fx = fixture().await;
        add_menu_item(&fx.db, &fx.org.id, "Prawn Fry", 500, true).await;
        add_menu_item(&fx.db, &fx.org.id, "Chai", 20, false).await;

        let menu = fx.db.menu().list(&fx.org.id, false).await.unwrap();
        assert_eq!(menu.len(), 2);
        let chai = menu.iter().find(|m| m.name == "Chai").unwrap();
        assert!(!chai.requires_daily_stock);
        assert!(chai.is_active);
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_active_listing() {
        let fx = fixture().await;
        let item = add_menu_item(&fx.db, &fx.org.id, "Crab Masala", 900, true).await;

        fx.db.menu().deactivate(&fx.org.id, &item.id).await.unwrap();

        assert!(fx.db.menu().list(&fx.org.id, false).await.unwrap().is_empty());
        let all = fx.db.menu().list(&fx.org.id, true).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_active);
    }

    #[tokio::test]
    async fn test_update_menu_item() {
        let fx = fixture().await;
        let mut item = add_menu_item(&fx.db, &fx.org.id, "Squid", 400, true).await;
        item.base_price_cents = 450;
        item.is_market_priced = true;

        let updated = fx.db.menu().update(&item).await.unwrap();
        assert!(updated.updated_at >= item.updated_at);

        let loaded = fx.db.menu().get(&fx.org.id, &item.id).await.unwrap();
        assert_eq!(loaded.base_price_cents, 450);
        assert!(loaded.is_market_priced);
    }
}
