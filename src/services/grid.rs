use crate::ledger::Ledger;
use crate::models::{MarginMode, Order, RawRow, RowPreview};
use crate::pricing::preview_row;

/// Rows staged for the next submission, all read under one margin mode.
#[derive(Debug, Clone, Default)]
pub struct BatchGrid {
    mode: MarginMode,
    rows: Vec<RawRow>,
}

impl BatchGrid {
    pub fn new(mode: MarginMode) -> Self {
        BatchGrid {
            mode,
            rows: Vec::new(),
        }
    }

    pub fn mode(&self) -> MarginMode {
        self.mode
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Switching modes changes the column set, so staged rows are dropped.
    pub fn set_mode(&mut self, mode: MarginMode) {
        if mode == self.mode {
            return;
        }
        tracing::debug!(from = %self.mode, to = %mode, dropped = self.rows.len(), "margin mode changed");
        self.mode = mode;
        self.rows.clear();
    }

    pub fn push_row(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn preview(&self) -> Vec<RowPreview> {
        self.rows
            .iter()
            .map(|row| preview_row(&row.to_candidate(self.mode)))
            .collect()
    }

    /// Moves the staged rows into `ledger` as one order. The grid is only
    /// emptied when an order was actually recorded.
    pub fn submit_into<'a>(&mut self, ledger: &'a mut Ledger) -> Option<&'a Order> {
        let order = ledger.submit_batch(&self.rows, self.mode)?;
        self.rows.clear();
        Some(order)
    }
}
