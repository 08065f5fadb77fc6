use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{LedgerSnapshot, MarginMode, OrderSummary, RawRow, RowPreview, Totals};
use crate::services::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridView {
    pub mode: MarginMode,
    pub columns: Vec<String>,
    pub rows: Vec<RowPreview>,
}

pub fn select_margin_mode(session_id: &str, label: &str, state: &AppState) -> Result<MarginMode> {
    let mode: MarginMode = label.parse()?;
    state.with_session(session_id, |session| session.grid.set_mode(mode))?;
    Ok(mode)
}

/// Stages a row and returns how many rows the grid now holds.
pub fn add_row(session_id: &str, row: RawRow, state: &AppState) -> Result<usize> {
    state.with_session(session_id, |session| {
        session.grid.push_row(row);
        session.grid.rows().len()
    })
}

pub fn preview_grid(session_id: &str, state: &AppState) -> Result<GridView> {
    state.with_session(session_id, |session| {
        let mode = session.grid.mode();
        GridView {
            mode,
            columns: mode.columns().iter().map(|c| c.to_string()).collect(),
            rows: session.grid.preview(),
        }
    })
}

pub fn clear_grid(session_id: &str, state: &AppState) -> Result<()> {
    state.with_session(session_id, |session| session.grid.clear())
}

/// Records the staged rows as one order. `None` means no row had an item name.
pub fn add_all_items(session_id: &str, state: &AppState) -> Result<Option<OrderSummary>> {
    state.with_session(session_id, |session| {
        session
            .grid
            .submit_into(&mut session.ledger)
            .map(OrderSummary::from)
    })
}

pub fn get_totals(session_id: &str, state: &AppState) -> Result<Totals> {
    state.with_session(session_id, |session| session.ledger.totals())
}

pub fn get_summary_text(session_id: &str, state: &AppState) -> Result<String> {
    state.with_session(session_id, |session| session.ledger.summary_text())
}

pub fn get_ledger(session_id: &str, state: &AppState) -> Result<LedgerSnapshot> {
    state.with_session(session_id, |session| session.ledger.snapshot())
}

pub fn clear_all_entries(session_id: &str, state: &AppState) -> Result<()> {
    state.with_session(session_id, |session| {
        session.ledger.clear();
        session.grid.clear();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::Settings;

    fn open() -> AppState {
        let state = AppState::new(Settings::default());
        state.open_session("s1").unwrap();
        state
    }

    #[test]
    fn test_add_all_items_flow() {
        let state = open();
        select_margin_mode("s1", "Fixed Amount", &state).unwrap();
        add_row("s1", RawRow::for_mode(MarginMode::FixedAmount, "Tomato", "10", "20", "5"), &state).unwrap();
        let staged = add_row("s1", RawRow::default(), &state).unwrap();
        assert_eq!(staged, 2);

        let order = add_all_items("s1", &state).unwrap().expect("order");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].selling_price, 25.0);
        assert_eq!(order.totals, Totals::new(200.0, 250.0));

        assert!(preview_grid("s1", &state).unwrap().rows.is_empty());
        assert_eq!(get_totals("s1", &state).unwrap(), Totals::new(200.0, 250.0));
        assert!(get_summary_text("s1", &state).unwrap().ends_with("Total Profit: 50.00"));
        assert_eq!(get_ledger("s1", &state).unwrap().orders.len(), 1);
    }

    #[test]
    fn test_add_all_items_without_names_returns_none() {
        let state = open();
        select_margin_mode("s1", "%", &state).unwrap();
        add_row("s1", RawRow::for_mode(MarginMode::Percent, "", "5", "10", "10"), &state).unwrap();

        assert_eq!(add_all_items("s1", &state).unwrap(), None);
        assert_eq!(get_totals("s1", &state).unwrap(), Totals::default());
        assert_eq!(preview_grid("s1", &state).unwrap().rows.len(), 1);
    }

    #[test]
    fn test_preview_grid_reports_mode_columns() {
        let state = open();
        let view = preview_grid("s1", &state).unwrap();
        assert_eq!(view.mode, MarginMode::SellingPrice);
        assert_eq!(view.columns[3], "Selling Price/kg");

        select_margin_mode("s1", "percent", &state).unwrap();
        add_row("s1", RawRow::for_mode(MarginMode::Percent, "Bean", "1", "10", "20"), &state).unwrap();
        let view = preview_grid("s1", &state).unwrap();
        assert_eq!(view.columns[3], "Margin %");
        assert_eq!(view.rows[0].selling_price, 12.0);
    }

    #[test]
    fn test_select_unknown_mode_fails() {
        let state = open();
        let err = select_margin_mode("s1", "markup", &state).unwrap_err();
        assert_eq!(err, Error::UnknownMarginMode("markup".to_string()));
    }

    #[test]
    fn test_clear_all_entries_resets_ledger_and_grid() {
        let state = open();
        select_margin_mode("s1", "fixed", &state).unwrap();
        add_row("s1", RawRow::for_mode(MarginMode::FixedAmount, "Tomato", "10", "20", "5"), &state).unwrap();
        add_all_items("s1", &state).unwrap();
        add_row("s1", RawRow::for_mode(MarginMode::FixedAmount, "Okra", "1", "1", "1"), &state).unwrap();

        clear_all_entries("s1", &state).unwrap();
        assert_eq!(get_totals("s1", &state).unwrap(), Totals::default());
        assert!(preview_grid("s1", &state).unwrap().rows.is_empty());
    }

    #[test]
    fn test_clear_grid_keeps_ledger() {
        let state = open();
        add_row("s1", RawRow::for_mode(MarginMode::SellingPrice, "Kale", "2", "5", "7"), &state).unwrap();
        add_all_items("s1", &state).unwrap();
        add_row("s1", RawRow::default(), &state).unwrap();

        clear_grid("s1", &state).unwrap();
        assert!(preview_grid("s1", &state).unwrap().rows.is_empty());
        assert_eq!(get_totals("s1", &state).unwrap().total_profit(), 4.0);
    }

    #[test]
    fn test_commands_require_open_session() {
        let state = AppState::new(Settings::default());
        assert!(matches!(get_totals("nope", &state), Err(Error::SessionNotFound(_))));
    }
}
