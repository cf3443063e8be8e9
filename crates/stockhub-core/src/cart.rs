//! # Terminal Cart and Settlement
//!
//! One [`TerminalSession`] per (outlet, user). The session owns the cart and
//! walks the settlement state machine:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │           add_item                    begin_settlement                  │
//! │   Idle ─────────────► Building ─────────────────────► Settling          │
//! │    ▲                   │    ▲                          │      │         │
//! │    │ remove/clear      │    │        fail_settlement   │      │         │
//! │    └──(cart empty)─────┘    └───────── (Failed) ───────┘      │         │
//! │    ▲                                                          │         │
//! │    └────────────────── complete_settlement (Success) ─────────┘         │
//! │                                                                         │
//! │  While Settling every cart mutation is rejected.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock checks run against a [`StockView`] built by the caller from a fresh
//! fetch: for stock-tracked items `on_ground - already_in_cart <= 0` blocks
//! the add. A line shows the price in force when it was added;
//! [`TerminalSession::begin_settlement`] reprices every line against the view
//! it is handed, so the sale carries the price at settlement.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::reconciliation::StockView;
use crate::types::{MenuItem, PaymentMethod, SaleLineItem, SaleTransaction};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub menu_item_id: String,
    /// Name at time of adding (frozen).
    pub name: String,
    /// Unit price as of the last pricing (add or settlement).
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub requires_daily_stock: bool,
}

impl CartLine {
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.unit_price_cents).times(self.quantity)
    }
}

/// Lines are unique by menu item; adding the same item bumps its quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn quantity_of(&self, menu_item_id: &str) -> i64 {
        self.lines
            .iter()
            .find(|l| l.menu_item_id == menu_item_id)
            .map_or(0, |l| l.quantity)
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    fn add_one(&mut self, item: &MenuItem, unit_price: Money) -> CoreResult<()> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.menu_item_id == item.id) {
            if line.quantity >= MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity += 1;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine {
            menu_item_id: item.id.clone(),
            name: item.name.clone(),
            unit_price_cents: unit_price.minor(),
            quantity: 1,
            requires_daily_stock: item.requires_daily_stock,
        });
        Ok(())
    }

    /// Applies the view's current price to every line still on the menu.
    fn reprice(&mut self, view: &StockView) {
        for line in &mut self.lines {
            if let Some(item) = view.menu_item(&line.menu_item_id) {
                line.unit_price_cents = view.unit_price(item).minor();
            }
        }
    }

    fn remove_one(&mut self, menu_item_id: &str) -> CoreResult<()> {
        let Some(index) = self
            .lines
            .iter()
            .position(|l| l.menu_item_id == menu_item_id)
        else {
            return Err(CoreError::ItemNotInCart(menu_item_id.to_string()));
        };

        self.lines[index].quantity -= 1;
        if self.lines[index].quantity <= 0 {
            self.lines.remove(index);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.lines.clear();
    }
}

// =============================================================================
// Session State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum SessionState {
    Idle,
    Building,
    Settling,
}

impl SessionState {
    fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Building => "building",
            SessionState::Settling => "settling",
        }
    }
}

/// How the most recent settlement ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "result", rename_all = "camelCase")]
#[ts(export)]
pub enum SettlementOutcome {
    Success {
        #[serde(rename = "transactionId")]
        transaction_id: String,
    },
    Failed {
        reason: String,
    },
}

/// Rows to insert for one settlement, built from the cart at the moment
/// settlement began.
#[derive(Debug, Clone)]
pub struct SettlementDraft {
    pub transaction: SaleTransaction,
    pub lines: Vec<SaleLineItem>,
}

// =============================================================================
// Terminal Session
// =============================================================================

#[derive(Debug, Clone)]
pub struct TerminalSession {
    outlet_id: String,
    user_id: String,
    state: SessionState,
    cart: Cart,
    last_outcome: Option<SettlementOutcome>,
}

impl TerminalSession {
    pub fn new(outlet_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        TerminalSession {
            outlet_id: outlet_id.into(),
            user_id: user_id.into(),
            state: SessionState::Idle,
            cart: Cart::default(),
            last_outcome: None,
        }
    }

    pub fn outlet_id(&self) -> &str {
        &self.outlet_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn last_outcome(&self) -> Option<&SettlementOutcome> {
        self.last_outcome.as_ref()
    }

    fn ensure_not_settling(&self, operation: &str) -> CoreResult<()> {
        if self.state == SessionState::Settling {
            return Err(CoreError::InvalidSessionState {
                state: self.state.as_str().to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Adds one unit of `item`.
    ///
    /// ## Rejected When
    /// - a settlement is in flight
    /// - the outlet has no distribution rows today (locked terminal)
    /// - the item is inactive
    /// - a stock-tracked item has nothing left once the cart is counted
    pub fn add_item(&mut self, item: &MenuItem, view: &StockView) -> CoreResult<()> {
        self.ensure_not_settling("add items")?;

        if view.outlet_is_locked(&self.outlet_id) {
            return Err(CoreError::TerminalLocked(self.outlet_id.clone()));
        }

        if !item.is_active {
            return Err(CoreError::ItemInactive(item.name.clone()));
        }

        if item.requires_daily_stock {
            let on_ground = view.on_ground(&item.id, Some(&self.outlet_id));
            if on_ground - self.cart.quantity_of(&item.id) <= 0 {
                return Err(CoreError::OutOfStock {
                    item: item.name.clone(),
                    available: on_ground,
                });
            }
        }

        self.cart.add_one(item, view.unit_price(item))?;
        self.state = SessionState::Building;
        Ok(())
    }

    /// Removes one unit; the line goes at zero and the session idles when
    /// the cart empties.
    pub fn remove_item(&mut self, menu_item_id: &str) -> CoreResult<()> {
        self.ensure_not_settling("remove items")?;
        self.cart.remove_one(menu_item_id)?;
        if self.cart.is_empty() {
            self.state = SessionState::Idle;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> CoreResult<()> {
        self.ensure_not_settling("clear the cart")?;
        self.cart.clear();
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Moves to `Settling` and drafts the rows to insert.
    ///
    /// Lines are repriced from `view` first (daily override, else base
    /// price). Beyond that the cart is left untouched until
    /// [`complete_settlement`](Self::complete_settlement).
    pub fn begin_settlement(
        &mut self,
        organization_id: &str,
        payment_method: PaymentMethod,
        view: &StockView,
        now: DateTime<Utc>,
    ) -> CoreResult<SettlementDraft> {
        self.ensure_not_settling("settle")?;

        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        self.cart.reprice(view);

        let transaction_id = Uuid::new_v4().to_string();
        let lines: Vec<SaleLineItem> = self
            .cart
            .lines()
            .iter()
            .map(|line| SaleLineItem {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction_id.clone(),
                menu_item_id: line.menu_item_id.clone(),
                item_name: line.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                subtotal_cents: line.subtotal().minor(),
            })
            .collect();

        let transaction = SaleTransaction {
            id: transaction_id,
            organization_id: organization_id.to_string(),
            outlet_id: self.outlet_id.clone(),
            total_amount_cents: self.cart.total().minor(),
            payment_method,
            created_by: self.user_id.clone(),
            is_paid: true,
            created_at: now,
        };

        self.state = SessionState::Settling;
        Ok(SettlementDraft { transaction, lines })
    }

    /// Success → Idle with an empty cart.
    pub fn complete_settlement(&mut self, transaction_id: &str) {
        self.cart.clear();
        self.state = SessionState::Idle;
        self.last_outcome = Some(SettlementOutcome::Success {
            transaction_id: transaction_id.to_string(),
        });
    }

    /// Failed → Building with the cart exactly as it was.
    pub fn fail_settlement(&mut self, reason: impl Into<String>) {
        self.state = if self.cart.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Building
        };
        self.last_outcome = Some(SettlementOutcome::Failed {
            reason: reason.into(),
        });
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            outlet_id: self.outlet_id.clone(),
            state: self.state,
            lines: self.cart.lines().to_vec(),
            item_count: self.cart.lines().len(),
            total_quantity: self.cart.total_quantity(),
            total_cents: self.cart.total().minor(),
            last_outcome: self.last_outcome.clone(),
        }
    }
}

/// Cart as returned to the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSnapshot {
    pub outlet_id: String,
    pub state: SessionState,
    pub lines: Vec<CartLine>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_cents: i64,
    pub last_outcome: Option<SettlementOutcome>,
}

// =============================================================================
// Low Stock Detection
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockAlert {
    pub menu_item_id: String,
    pub item_name: String,
    pub remaining: i64,
}

/// Stock-tracked items of a settled sale whose on-ground quantity is at or
/// below `threshold`.
///
/// `view` must be built after the sale rows were written.
pub fn low_stock_alerts(
    view: &StockView,
    outlet_id: &str,
    lines: &[SaleLineItem],
    threshold: i64,
) -> Vec<LowStockAlert> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .filter(|line| seen.insert(line.menu_item_id.as_str()))
        .filter(|line| view.is_stock_tracked(&line.menu_item_id))
        .filter_map(|line| {
            let remaining = view.on_ground(&line.menu_item_id, Some(outlet_id));
            (remaining <= threshold).then(|| LowStockAlert {
                menu_item_id: line.menu_item_id.clone(),
                item_name: line.item_name.clone(),
                remaining,
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::tests::{day, dist, menu_item, sold_at, utc};
    use crate::reconciliation::LedgerSet;
    use crate::types::{DistributionEntry, MasterStockEntry, SoldLine};
    use crate::LOW_STOCK_THRESHOLD;
    use chrono::TimeZone;

    fn view_with(
        menu: &[MenuItem],
        master: &[MasterStockEntry],
        dists: &[DistributionEntry],
        sales: &[SoldLine],
    ) -> StockView {
        StockView::build(
            day(),
            utc(),
            menu,
            LedgerSet {
                master,
                distributions: dists,
                sales,
            },
        )
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_add_blocked_once_cart_holds_all_live_stock() {
        let prawn = menu_item("prawn", 500, true);
        let master = vec![MasterStockEntry::new("org", "prawn", day(), 100, None)];
        let dists = vec![dist("o1", "prawn", 40)];
        let sales = vec![sold_at("o1", "prawn", 15, noon())];
        let view = view_with(&[prawn.clone()], &master, &dists, &sales);

        let mut session = TerminalSession::new("o1", "staff-1");
        for _ in 0..25 {
            session.add_item(&prawn, &view).unwrap();
        }
        assert_eq!(session.cart().quantity_of("prawn"), 25);

        let err = session.add_item(&prawn, &view).unwrap_err();
        assert_eq!(
            err,
            CoreError::OutOfStock {
                item: "Item prawn".to_string(),
                available: 25
            }
        );
        assert_eq!(session.cart().quantity_of("prawn"), 25);
    }

    #[test]
    fn test_continuous_supply_adds_without_limit() {
        let prawn = menu_item("prawn", 500, true);
        let tea = menu_item("tea", 20, false);
        // The outlet is unlocked by any distribution row
        let dists = vec![dist("o1", "prawn", 1)];
        let view = view_with(&[prawn, tea.clone()], &[], &dists, &[]);

        let mut session = TerminalSession::new("o1", "staff-1");
        for _ in 0..300 {
            session.add_item(&tea, &view).unwrap();
        }
        assert_eq!(session.cart().quantity_of("tea"), 300);
        assert_eq!(session.cart().total().minor(), 6000);
    }

    #[test]
    fn test_locked_terminal_rejects_add() {
        let tea = menu_item("tea", 20, false);
        let view = view_with(&[tea.clone()], &[], &[], &[]);

        let mut session = TerminalSession::new("o1", "staff-1");
        assert_eq!(
            session.add_item(&tea, &view).unwrap_err(),
            CoreError::TerminalLocked("o1".to_string())
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_inactive_item_rejected() {
        let mut tea = menu_item("tea", 20, false);
        tea.is_active = false;
        let dists = vec![dist("o1", "tea", 1)];
        let view = view_with(&[tea.clone()], &[], &dists, &[]);

        let mut session = TerminalSession::new("o1", "staff-1");
        assert!(matches!(
            session.add_item(&tea, &view),
            Err(CoreError::ItemInactive(_))
        ));
    }

    #[test]
    fn test_daily_price_override_applied_on_add() {
        let prawn = menu_item("prawn", 500, true);
        let master = vec![MasterStockEntry::new("org", "prawn", day(), 10, Some(650))];
        let dists = vec![dist("o1", "prawn", 10)];
        let view = view_with(&[prawn.clone()], &master, &dists, &[]);

        let mut session = TerminalSession::new("o1", "staff-1");
        session.add_item(&prawn, &view).unwrap();
        session.add_item(&prawn, &view).unwrap();

        assert_eq!(session.cart().lines()[0].unit_price_cents, 650);
        assert_eq!(session.cart().total().minor(), 1300);
    }

    #[test]
    fn test_settlement_charges_price_in_force_at_settlement() {
        let prawn = menu_item("prawn", 500, true);
        let dists = vec![dist("o1", "prawn", 10)];
        let before = vec![MasterStockEntry::new("org", "prawn", day(), 10, None)];
        let view = view_with(&[prawn.clone()], &before, &dists, &[]);

        let mut session = TerminalSession::new("o1", "staff-1");
        session.add_item(&prawn, &view).unwrap();
        session.add_item(&prawn, &view).unwrap();
        assert_eq!(session.cart().lines()[0].unit_price_cents, 500);

        // Admin sets a daily price while the cart is open
        let after = vec![MasterStockEntry::new("org", "prawn", day(), 10, Some(650))];
        let view = view_with(&[prawn], &after, &dists, &[]);

        let draft = session
            .begin_settlement("org", PaymentMethod::Cash, &view, noon())
            .unwrap();
        assert_eq!(draft.lines[0].unit_price_cents, 650);
        assert_eq!(draft.lines[0].subtotal_cents, 1300);
        assert_eq!(draft.transaction.total_amount_cents, 1300);
        assert_eq!(session.snapshot().total_cents, 1300);
    }

    #[test]
    fn test_remove_and_clear_return_to_idle() {
        let tea = menu_item("tea", 20, false);
        let dists = vec![dist("o1", "tea", 1)];
        let view = view_with(&[tea.clone()], &[], &dists, &[]);

        let mut session = TerminalSession::new("o1", "staff-1");
        session.add_item(&tea, &view).unwrap();
        session.add_item(&tea, &view).unwrap();
        assert_eq!(session.state(), SessionState::Building);

        session.remove_item("tea").unwrap();
        assert_eq!(session.state(), SessionState::Building);
        session.remove_item("tea").unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.cart().is_empty());
        assert!(matches!(
            session.remove_item("tea"),
            Err(CoreError::ItemNotInCart(_))
        ));

        session.add_item(&tea, &view).unwrap();
        session.clear().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_settlement_success_path() {
        let tea = menu_item("tea", 20, false);
        let dists = vec![dist("o1", "tea", 1)];
        let view = view_with(&[tea.clone()], &[], &dists, &[]);

        let mut session = TerminalSession::new("o1", "staff-1");
        assert_eq!(
            session
                .begin_settlement("org", PaymentMethod::Cash, &view, noon())
                .unwrap_err(),
            CoreError::EmptyCart
        );

        session.add_item(&tea, &view).unwrap();
        session.add_item(&tea, &view).unwrap();
        let draft = session
            .begin_settlement("org", PaymentMethod::Upi, &view, noon())
            .unwrap();

        assert_eq!(session.state(), SessionState::Settling);
        assert_eq!(draft.transaction.total_amount_cents, 40);
        assert!(draft.transaction.is_paid);
        assert_eq!(draft.transaction.created_by, "staff-1");
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].subtotal_cents, 40);
        assert_eq!(draft.lines[0].transaction_id, draft.transaction.id);

        // Mutations are refused mid-settlement
        assert!(matches!(
            session.add_item(&tea, &view),
            Err(CoreError::InvalidSessionState { .. })
        ));
        assert!(session.clear().is_err());

        session.complete_settlement(&draft.transaction.id);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.cart().is_empty());
        assert!(matches!(
            session.last_outcome(),
            Some(SettlementOutcome::Success { .. })
        ));
    }

    #[test]
    fn test_settlement_failure_keeps_cart() {
        let tea = menu_item("tea", 20, false);
        let dists = vec![dist("o1", "tea", 1)];
        let view = view_with(&[tea.clone()], &[], &dists, &[]);

        let mut session = TerminalSession::new("o1", "staff-1");
        session.add_item(&tea, &view).unwrap();
        session
            .begin_settlement("org", PaymentMethod::Card, &view, noon())
            .unwrap();

        session.fail_settlement("database is locked");

        assert_eq!(session.state(), SessionState::Building);
        assert_eq!(session.cart().quantity_of("tea"), 1);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.total_cents, 20);
        assert_eq!(
            snapshot.last_outcome,
            Some(SettlementOutcome::Failed {
                reason: "database is locked".to_string()
            })
        );
    }

    #[test]
    fn test_line_quantity_capped() {
        let tea = menu_item("tea", 20, false);
        let dists = vec![dist("o1", "tea", 1)];
        let view = view_with(&[tea.clone()], &[], &dists, &[]);

        let mut session = TerminalSession::new("o1", "staff-1");
        for _ in 0..MAX_ITEM_QUANTITY {
            session.add_item(&tea, &view).unwrap();
        }
        assert_eq!(
            session.add_item(&tea, &view).unwrap_err(),
            CoreError::QuantityTooLarge {
                max: MAX_ITEM_QUANTITY
            }
        );
    }

    #[test]
    fn test_distinct_lines_capped() {
        let mut menu = Vec::new();
        let mut dists = Vec::new();
        for i in 0..=MAX_CART_ITEMS {
            let id = format!("item-{}", i);
            menu.push(menu_item(&id, 10, false));
            dists.push(dist("o1", &id, 1));
        }
        let view = view_with(&menu, &[], &dists, &[]);

        let mut session = TerminalSession::new("o1", "staff-1");
        for item in &menu[..MAX_CART_ITEMS] {
            session.add_item(item, &view).unwrap();
        }
        assert_eq!(
            session.add_item(&menu[MAX_CART_ITEMS], &view).unwrap_err(),
            CoreError::CartTooLarge {
                max: MAX_CART_ITEMS
            }
        );
        assert_eq!(session.cart().lines().len(), MAX_CART_ITEMS);
    }

    #[test]
    fn test_low_stock_alerts_after_sale() {
        let prawn = menu_item("prawn", 500, true);
        let crab = menu_item("crab", 900, true);
        let tea = menu_item("tea", 20, false);
        let master = vec![
            MasterStockEntry::new("org", "prawn", day(), 100, None),
            MasterStockEntry::new("org", "crab", day(), 100, None),
        ];
        let dists = vec![dist("o1", "prawn", 40), dist("o1", "crab", 40)];
        let sales = vec![
            sold_at("o1", "prawn", 30, noon()),
            sold_at("o1", "crab", 5, noon()),
        ];
        let view = view_with(&[prawn, crab, tea], &master, &dists, &sales);

        let line = |item: &str, qty: i64| SaleLineItem {
            id: Uuid::new_v4().to_string(),
            transaction_id: "t1".to_string(),
            menu_item_id: item.to_string(),
            item_name: format!("Item {}", item),
            quantity: qty,
            unit_price_cents: 100,
            subtotal_cents: 100 * qty,
        };

        let alerts = low_stock_alerts(
            &view,
            "o1",
            &[line("prawn", 30), line("crab", 5), line("tea", 9)],
            LOW_STOCK_THRESHOLD,
        );

        assert_eq!(
            alerts,
            vec![LowStockAlert {
                menu_item_id: "prawn".to_string(),
                item_name: "Item prawn".to_string(),
                remaining: 10,
            }]
        );
    }
}
