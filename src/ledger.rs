use chrono::{DateTime, Local};

use crate::models::{LedgerSnapshot, MarginMode, Order, OrderSummary, RawRow, RowCandidate, Totals};
use crate::pricing::price_row;
use crate::utils::{format_date, format_decimal};

pub const SUMMARY_TITLE: &str = "Purchase Summary";

/// Every order submitted during one session, in submission order.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    orders: Vec<Order>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    pub fn submit_batch(&mut self, rows: &[RawRow], mode: MarginMode) -> Option<&Order> {
        self.submit_batch_at(rows, mode, Local::now())
    }

    pub fn submit_batch_at(
        &mut self,
        rows: &[RawRow],
        mode: MarginMode,
        created_at: DateTime<Local>,
    ) -> Option<&Order> {
        let candidates = rows.iter().map(|row| row.to_candidate(mode)).collect();
        self.submit_candidates_at(candidates, created_at)
    }

    pub fn submit_candidates(&mut self, candidates: Vec<RowCandidate>) -> Option<&Order> {
        self.submit_candidates_at(candidates, Local::now())
    }

    /// Prices the non-blank candidates and records them as one order. A batch
    /// with no named rows leaves the ledger untouched.
    pub fn submit_candidates_at(
        &mut self,
        candidates: Vec<RowCandidate>,
        created_at: DateTime<Local>,
    ) -> Option<&Order> {
        let submitted = candidates.len();
        let items: Vec<_> = candidates
            .into_iter()
            .filter(|candidate| {
                let keep = !candidate.is_blank();
                if !keep {
                    tracing::debug!("skipping row without item name");
                }
                keep
            })
            .map(price_row)
            .collect();

        if items.is_empty() {
            tracing::debug!(submitted, "batch had no named rows, nothing recorded");
            return None;
        }

        let order = Order::new(items, created_at);
        tracing::info!(
            order_id = %order.id(),
            items = order.items().len(),
            skipped = submitted - order.items().len(),
            "order recorded"
        );
        self.orders.push(order);
        self.orders.last()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.orders.iter().map(|order| order.items().len()).sum()
    }

    pub fn totals(&self) -> Totals {
        Totals::from_items(self.orders.iter().flat_map(|order| order.items()))
    }

    pub fn clear(&mut self) {
        let removed = self.orders.len();
        self.orders.clear();
        tracing::info!(removed, "ledger cleared");
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            orders: self.orders.iter().map(OrderSummary::from).collect(),
            totals: self.totals(),
        }
    }

    pub fn summary_text(&self) -> String {
        let mut lines = vec![SUMMARY_TITLE.to_string(), String::new()];

        for (index, order) in self.orders.iter().enumerate() {
            lines.push(format!(
                "Order {} | Date: {}",
                index + 1,
                format_date(&order.created_at())
            ));
            lines.extend(order.items().iter().map(|item| {
                format!(
                    "Item Name: {} | Qty: {} kg | Buying Price/kg: {} | Selling Price/kg: {} | Profit: {}",
                    item.item_name(),
                    format_decimal(item.quantity()),
                    format_decimal(item.purchase_price()),
                    format_decimal(item.selling_price()),
                    format_decimal(item.profit())
                )
            }));
            lines.push("---".to_string());
        }

        let totals = self.totals();
        lines.push(String::new());
        lines.push(format!("Total Buying Price: {}", format_decimal(totals.total_buy())));
        lines.push(format!("Total Selling Price: {}", format_decimal(totals.total_sell())));
        lines.push(format!("Total Profit: {}", format_decimal(totals.total_profit())));
        lines.join("\n")
    }
}
