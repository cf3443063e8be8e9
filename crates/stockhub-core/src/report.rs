//! # Daily Report
//!
//! Aggregates one day's settled transactions by outlet, by payment method and
//! by menu item, and attaches the day's stock summary.
//!
//! ```text
//! transactions + transaction_items (day window)
//!      │
//!      ▼
//! build_daily_report() ← THIS MODULE
//!      │
//!      ├── byOutlet         count + total per outlet
//!      ├── byPaymentMethod  count + total per cash / card / upi
//!      ├── byItem           quantity + revenue per menu item
//!      └── stock            StockView::item_summaries()
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::reconciliation::{ItemStockSummary, StockView};
use crate::types::{Outlet, PaymentMethod, SaleLineItem, SaleTransaction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OutletSales {
    pub outlet_id: String,
    pub outlet_name: String,
    pub transaction_count: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentMethodSales {
    pub payment_method: PaymentMethod,
    pub transaction_count: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemSales {
    pub menu_item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyReport {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub transaction_count: i64,
    pub grand_total_cents: i64,
    pub by_outlet: Vec<OutletSales>,
    pub by_payment_method: Vec<PaymentMethodSales>,
    pub by_item: Vec<ItemSales>,
    pub stock: Vec<ItemStockSummary>,
}

/// Builds the report for `view.day()`.
///
/// `transactions` should already be restricted to the day; line items whose
/// transaction is not among them are ignored. Outlets are listed by name,
/// items by revenue (highest first).
pub fn build_daily_report(
    view: &StockView,
    outlets: &[Outlet],
    transactions: &[SaleTransaction],
    lines: &[SaleLineItem],
) -> DailyReport {
    let outlet_names: HashMap<&str, &str> = outlets
        .iter()
        .map(|o| (o.id.as_str(), o.name.as_str()))
        .collect();

    let mut by_outlet: HashMap<&str, (i64, i64)> = HashMap::new();
    let mut by_method: BTreeMap<PaymentMethod, (i64, i64)> = BTreeMap::new();
    for txn in transactions {
        let outlet = by_outlet.entry(txn.outlet_id.as_str()).or_default();
        outlet.0 += 1;
        outlet.1 += txn.total_amount_cents;

        let method = by_method.entry(txn.payment_method).or_default();
        method.0 += 1;
        method.1 += txn.total_amount_cents;
    }

    let included: HashSet<&str> = transactions.iter().map(|t| t.id.as_str()).collect();
    let mut by_item: HashMap<&str, ItemSales> = HashMap::new();
    for line in lines
        .iter()
        .filter(|l| included.contains(l.transaction_id.as_str()))
    {
        let entry = by_item
            .entry(line.menu_item_id.as_str())
            .or_insert_with(|| ItemSales {
                menu_item_id: line.menu_item_id.clone(),
                item_name: line.item_name.clone(),
                quantity: 0,
                revenue_cents: 0,
            });
        entry.quantity += line.quantity;
        entry.revenue_cents += line.subtotal_cents;
    }

    let mut outlet_rows: Vec<OutletSales> = by_outlet
        .into_iter()
        .map(|(id, (count, total))| OutletSales {
            outlet_id: id.to_string(),
            outlet_name: outlet_names.get(id).copied().unwrap_or(id).to_string(),
            transaction_count: count,
            total_cents: total,
        })
        .collect();
    outlet_rows.sort_by(|a, b| {
        a.outlet_name
            .cmp(&b.outlet_name)
            .then_with(|| a.outlet_id.cmp(&b.outlet_id))
    });

    let mut item_rows: Vec<ItemSales> = by_item.into_values().collect();
    item_rows.sort_by(|a, b| {
        b.revenue_cents
            .cmp(&a.revenue_cents)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });

    DailyReport {
        date: view.day(),
        transaction_count: transactions.len() as i64,
        grand_total_cents: transactions.iter().map(|t| t.total_amount_cents).sum(),
        by_outlet: outlet_rows,
        by_payment_method: by_method
            .into_iter()
            .map(|(method, (count, total))| PaymentMethodSales {
                payment_method: method,
                transaction_count: count,
                total_cents: total,
            })
            .collect(),
        by_item: item_rows,
        stock: view.item_summaries(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::tests::{day, menu_item, utc};
    use crate::reconciliation::LedgerSet;
    use chrono::{TimeZone, Utc};

    fn outlet(id: &str, name: &str) -> Outlet {
        Outlet {
            id: id.to_string(),
            organization_id: "org".to_string(),
            name: name.to_string(),
            location: None,
            table_count: 10,
            created_at: Utc::now(),
        }
    }

    fn txn(id: &str, outlet: &str, total: i64, method: PaymentMethod) -> SaleTransaction {
        SaleTransaction {
            id: id.to_string(),
            organization_id: "org".to_string(),
            outlet_id: outlet.to_string(),
            total_amount_cents: total,
            payment_method: method,
            created_by: "staff-1".to_string(),
            is_paid: true,
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap(),
        }
    }

    fn line(txn: &str, item: &str, qty: i64, price: i64) -> SaleLineItem {
        SaleLineItem {
            id: format!("{}-{}", txn, item),
            transaction_id: txn.to_string(),
            menu_item_id: item.to_string(),
            item_name: format!("Item {}", item),
            quantity: qty,
            unit_price_cents: price,
            subtotal_cents: qty * price,
        }
    }

    #[test]
    fn test_daily_report_aggregates() {
        let menu = vec![menu_item("prawn", 500, true), menu_item("tea", 20, false)];
        let view = StockView::build(day(), utc(), &menu, LedgerSet::default());
        let outlets = vec![outlet("o1", "Beach Road"), outlet("o2", "Anna Nagar")];
        let transactions = vec![
            txn("t1", "o1", 1040, PaymentMethod::Cash),
            txn("t2", "o1", 500, PaymentMethod::Upi),
            txn("t3", "o2", 60, PaymentMethod::Cash),
        ];
        let lines = vec![
            line("t1", "prawn", 2, 500),
            line("t1", "tea", 2, 20),
            line("t2", "prawn", 1, 500),
            line("t3", "tea", 3, 20),
            // Belongs to a transaction outside the day
            line("t9", "prawn", 50, 500),
        ];

        let report = build_daily_report(&view, &outlets, &transactions, &lines);

        assert_eq!(report.date, day());
        assert_eq!(report.transaction_count, 3);
        assert_eq!(report.grand_total_cents, 1600);

        assert_eq!(report.by_outlet[0].outlet_name, "Anna Nagar");
        assert_eq!(report.by_outlet[0].total_cents, 60);
        assert_eq!(report.by_outlet[1].transaction_count, 2);
        assert_eq!(report.by_outlet[1].total_cents, 1540);

        assert_eq!(report.by_payment_method[0].payment_method, PaymentMethod::Cash);
        assert_eq!(report.by_payment_method[0].total_cents, 1100);
        assert_eq!(report.by_payment_method[1].payment_method, PaymentMethod::Upi);

        assert_eq!(report.by_item[0].menu_item_id, "prawn");
        assert_eq!(report.by_item[0].quantity, 3);
        assert_eq!(report.by_item[0].revenue_cents, 1500);
        assert_eq!(report.by_item[1].quantity, 5);

        assert_eq!(report.stock.len(), 2);
    }

    #[test]
    fn test_empty_day() {
        let view = StockView::empty(day(), &[]);
        let report = build_daily_report(&view, &[], &[], &[]);
        assert_eq!(report.transaction_count, 0);
        assert_eq!(report.grand_total_cents, 0);
        assert!(report.by_outlet.is_empty());
        assert!(report.by_item.is_empty());
    }
}
