//! # Sale Repository
//!
//! Database operations for the sales ledger (`transactions` +
//! `transaction_items`).
//!
//! ## Settlement Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Settlement                                        │
//! │                                                                         │
//! │  1. INSERT transactions       ← one row, total + payment method         │
//! │  2. INSERT transaction_items  ← one row per cart line (price snapshot)  │
//! │                                                                         │
//! │  No surrounding transaction: a failure in step 2 leaves the header     │
//! │  row behind and the terminal keeps its cart for a retry.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::changes::{ChangeEvent, ChangeFeed, ChangeOp, ChangeTable};
use crate::error::DbResult;
use stockhub_core::cart::SettlementDraft;
use stockhub_core::{SaleLineItem, SaleTransaction, SoldLine};

/// Repository for sales ledger operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        SaleRepository { pool, feed }
    }

    pub async fn insert_transaction(&self, txn: &SaleTransaction) -> DbResult<()> {
        debug!(id = %txn.id, total = txn.total_amount_cents, "Inserting transaction");

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, organization_id, outlet_id, total_amount_cents,
                payment_method, created_by, is_paid, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&txn.id)
        .bind(&txn.organization_id)
        .bind(&txn.outlet_id)
        .bind(txn.total_amount_cents)
        .bind(txn.payment_method)
        .bind(&txn.created_by)
        .bind(txn.is_paid)
        .bind(txn.created_at)
        .execute(&self.pool)
        .await?;

        self.feed.publish(ChangeEvent::new(
            ChangeTable::Transactions,
            ChangeOp::Insert,
            &txn.organization_id,
            &txn.id,
        ));
        Ok(())
    }

    /// Inserts the lines of one transaction. Stops at the first failure.
    pub async fn insert_line_items(&self, organization_id: &str, lines: &[SaleLineItem]) -> DbResult<()> {
        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, menu_item_id, item_name,
                    quantity, unit_price_cents, subtotal_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&line.id)
            .bind(&line.transaction_id)
            .bind(&line.menu_item_id)
            .bind(&line.item_name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.subtotal_cents)
            .execute(&self.pool)
            .await?;

            self.feed.publish(ChangeEvent::new(
                ChangeTable::TransactionItems,
                ChangeOp::Insert,
                organization_id,
                &line.id,
            ));
        }
        Ok(())
    }

    /// Writes a settlement draft: header first, then lines.
    pub async fn record_settlement(&self, draft: &SettlementDraft) -> DbResult<()> {
        self.insert_transaction(&draft.transaction).await?;
        self.insert_line_items(&draft.transaction.organization_id, &draft.lines)
            .await?;

        info!(
            id = %draft.transaction.id,
            outlet = %draft.transaction.outlet_id,
            lines = draft.lines.len(),
            total = draft.transaction.total_amount_cents,
            method = draft.transaction.payment_method.as_str(),
            "Sale settled"
        );
        Ok(())
    }

    /// Line items joined with their transaction's outlet and timestamp, for
    /// sales in `[start, end)`.
    pub async fn sold_lines(
        &self,
        organization_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SoldLine>> {
        let rows = sqlx::query_as::<_, SoldLine>(
            r#"
            SELECT t.outlet_id, ti.menu_item_id, ti.quantity, t.created_at AS sold_at
            FROM transaction_items ti
            JOIN transactions t ON t.id = ti.transaction_id
            WHERE t.organization_id = ?1 AND t.created_at >= ?2 AND t.created_at < ?3
            "#,
        )
        .bind(organization_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Transactions in `[start, end)`, oldest first.
    pub async fn transactions_between(
        &self,
        organization_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SaleTransaction>> {
        let rows = sqlx::query_as::<_, SaleTransaction>(
            r#"
            SELECT id, organization_id, outlet_id, total_amount_cents,
                   payment_method, created_by, is_paid, created_at
            FROM transactions
            WHERE organization_id = ?1 AND created_at >= ?2 AND created_at < ?3
            ORDER BY created_at, id
            "#,
        )
        .bind(organization_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Lines of the transactions in `[start, end)`.
    pub async fn line_items_between(
        &self,
        organization_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SaleLineItem>> {
        let rows = sqlx::query_as::<_, SaleLineItem>(
            r#"
            SELECT ti.id, ti.transaction_id, ti.menu_item_id, ti.item_name,
                   ti.quantity, ti.unit_price_cents, ti.subtotal_cents
            FROM transaction_items ti
            JOIN transactions t ON t.id = ti.transaction_id
            WHERE t.organization_id = ?1 AND t.created_at >= ?2 AND t.created_at < ?3
            "#,
        )
        .bind(organization_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[cfg(test)]
    async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<SaleLineItem>> {
        let rows = sqlx::query_as::<_, SaleLineItem>(
            r#"
            SELECT id, transaction_id, menu_item_id, item_name,
                   quantity, unit_price_cents, subtotal_cents
            FROM transaction_items
            WHERE transaction_id = ?1
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
