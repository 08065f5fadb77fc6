use anyhow::{anyhow, Result};
use std::io::{self, BufRead, Write};

use purchase_ledger::commands::{purchases, settings as settings_commands};
use purchase_ledger::models::{MarginMode, RawRow, Settings};
use purchase_ledger::services::state::AppState;
use purchase_ledger::utils::format_decimal;

const SESSION_ID: &str = "terminal";

const HELP: &str = "\
commands:
  mode <Fixed Amount|%|Selling Price per kg>   select margin mode (clears staged rows)
  row <name>;<qty>;<price/kg>;<margin>         stage a row for the current mode
  preview                                      show staged rows with derived prices
  add                                          add all staged items as one order
  clear-grid                                   drop staged rows
  totals                                       grand totals
  summary                                      shareable summary text
  json                                         ledger snapshot as JSON
  settings                                     current settings
  clear                                        clear all entries
  quit";

fn main() -> Result<()> {
    let settings = load_settings(|key| std::env::var(key).ok());
    let level = settings
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let state = AppState::new(settings);
    state.open_session(SESSION_ID)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "Purchase Manager (type `help`)")?;
    run_session(stdin.lock(), &state, &mut stdout)?;

    state.close_session(SESSION_ID)?;
    Ok(())
}

/// Reads commands until `quit` or end of input. Lines that are not valid UTF-8
/// are decoded lossily, and a failing command is reported without ending the session.
fn run_session(input: impl BufRead, state: &AppState, out: &mut impl Write) -> Result<()> {
    for line in input.split(b'\n') {
        let line = String::from_utf8_lossy(&line?).into_owned();
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        if let Err(err) = run_command(line, state, out) {
            writeln!(out, "error: {}", err)?;
        }
    }
    Ok(())
}

fn run_command(line: &str, state: &AppState, out: &mut impl Write) -> Result<()> {
    let (command, args) = match line.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim()),
        None => (line, ""),
    };

    match command {
        "help" => writeln!(out, "{}", HELP)?,
        "mode" => {
            let mode = purchases::select_margin_mode(SESSION_ID, args, state)?;
            writeln!(out, "margin mode: {} ({})", mode, mode.columns().join(" | "))?;
        }
        "row" => {
            let mode = purchases::preview_grid(SESSION_ID, state)?.mode;
            let row = parse_row(mode, args)?;
            let staged = purchases::add_row(SESSION_ID, row, state)?;
            writeln!(out, "{} row(s) staged", staged)?;
        }
        "preview" => {
            let view = purchases::preview_grid(SESSION_ID, state)?;
            writeln!(out, "{}", view.columns.join(" | "))?;
            for row in view.rows {
                writeln!(
                    out,
                    "{} | {} kg | buy {} | sell {} | margin {}",
                    row.item_name,
                    format_decimal(row.quantity),
                    format_decimal(row.purchase_price),
                    format_decimal(row.selling_price),
                    format_decimal(row.margin_value)
                )?;
            }
            writeln!(out, "Review items before adding them.")?;
        }
        "add" => match purchases::add_all_items(SESSION_ID, state)? {
            Some(order) => writeln!(out, "Added {} items successfully!", order.items.len())?,
            None => writeln!(out, "Please enter an item name.")?,
        },
        "clear-grid" => purchases::clear_grid(SESSION_ID, state)?,
        "totals" => {
            let totals = purchases::get_totals(SESSION_ID, state)?;
            writeln!(out, "Total Buying Price: {}", format_decimal(totals.total_buy()))?;
            writeln!(out, "Total Selling Price: {}", format_decimal(totals.total_sell()))?;
            writeln!(out, "Total Profit: {}", format_decimal(totals.total_profit()))?;
        }
        "summary" => writeln!(out, "{}", purchases::get_summary_text(SESSION_ID, state)?)?,
        "json" => {
            let snapshot = purchases::get_ledger(SESSION_ID, state)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
        }
        "settings" => {
            let settings = settings_commands::get_settings(state)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&settings)?)?;
        }
        "clear" => {
            purchases::clear_all_entries(SESSION_ID, state)?;
            writeln!(out, "All entries cleared.")?;
        }
        other => return Err(anyhow!("unknown command `{}`", other)),
    }
    Ok(())
}

/// `name;qty;price;margin`, trailing fields may be left out.
fn parse_row(mode: MarginMode, args: &str) -> Result<RawRow> {
    let fields: Vec<&str> = args.split(';').map(str::trim).collect();
    if fields.len() > 4 {
        return Err(purchase_ledger::Error::InvalidRow(format!(
            "expected at most 4 fields, got {}",
            fields.len()
        ))
        .into());
    }
    let field = |index: usize| fields.get(index).copied().unwrap_or_default();
    Ok(RawRow::for_mode(mode, field(0), field(1), field(2), field(3)))
}

fn load_settings(lookup: impl Fn(&str) -> Option<String>) -> Settings {
    let defaults = Settings::default();
    let default_margin_mode = lookup("PURCHASE_DEFAULT_MARGIN_MODE")
        .and_then(|value| value.parse::<MarginMode>().ok())
        .unwrap_or(defaults.default_margin_mode);
    let log_level = lookup("PURCHASE_LOG_LEVEL")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(defaults.log_level);
    Settings {
        default_margin_mode,
        log_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purchase_ledger::models::MarginInput;

    #[test]
    fn test_parse_row_fills_mode_column() {
        let row = parse_row(MarginMode::Percent, "Tomato; 10; 20; 25").unwrap();
        let candidate = row.to_candidate(MarginMode::Percent);
        assert_eq!(candidate.item_name, "Tomato");
        assert_eq!(candidate.quantity, 10.0);
        assert_eq!(candidate.margin, MarginInput::Percent { margin_percent: 25.0 });
    }

    #[test]
    fn test_parse_row_missing_fields_are_blank() {
        let row = parse_row(MarginMode::FixedAmount, "Onion").unwrap();
        let candidate = row.to_candidate(MarginMode::FixedAmount);
        assert_eq!(candidate.quantity, 0.0);
        assert_eq!(candidate.purchase_price, 0.0);
        assert!(parse_row(MarginMode::FixedAmount, "a;1;2;3;4").is_err());
    }

    #[test]
    fn test_load_settings_falls_back_to_defaults() {
        let settings = load_settings(|_| None);
        assert_eq!(settings, Settings::default());

        let settings = load_settings(|key| match key {
            "PURCHASE_DEFAULT_MARGIN_MODE" => Some("fixed".to_string()),
            "PURCHASE_LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        });
        assert_eq!(settings.default_margin_mode, MarginMode::FixedAmount);
        assert_eq!(settings.log_level, "debug");

        let settings = load_settings(|_| Some("nonsense".to_string()));
        assert_eq!(settings.default_margin_mode, MarginMode::SellingPrice);
    }

    #[test]
    fn test_run_command_round() {
        let state = AppState::new(Settings::default());
        state.open_session(SESSION_ID).unwrap();
        let mut out = Vec::new();

        run_command("mode Fixed Amount", &state, &mut out).unwrap();
        run_command("row Tomato;10;20;5", &state, &mut out).unwrap();
        run_command("add", &state, &mut out).unwrap();
        run_command("totals", &state, &mut out).unwrap();
        assert!(run_command("bogus", &state, &mut out).is_err());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Added 1 items successfully!"));
        assert!(text.contains("Total Profit: 50.00"));
    }

    #[test]
    fn test_run_session_survives_invalid_utf8_line() {
        let state = AppState::new(Settings::default());
        state.open_session(SESSION_ID).unwrap();
        let mut input = b"mode fixed\nrow Tomato;10;20;5\nadd\n".to_vec();
        input.extend_from_slice(b"row Bad\xff;1;1;1\nbogus \xfe\ntotals\nsummary\n");
        let mut out = Vec::new();

        run_session(&input[..], &state, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Added 1 items successfully!"));
        assert!(text.contains("error: unknown command `bogus`"));
        assert!(text.contains("Total Buying Price: 200.00"));
        assert!(text.contains("Order 1 | Date:"));
        let staged = state
            .with_session(SESSION_ID, |session| session.grid.rows().len())
            .unwrap();
        assert_eq!(staged, 1);
    }

    #[test]
    fn test_run_session_stops_at_quit() {
        let state = AppState::new(Settings::default());
        state.open_session(SESSION_ID).unwrap();
        let mut out = Vec::new();

        run_session(&b"quit\ntotals\n"[..], &state, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
