pub mod commands;
pub mod error;
pub mod ledger;
pub mod models;
pub mod pricing;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
pub use ledger::Ledger;
pub use models::{LineItem, MarginInput, MarginMode, Order, RawRow, RowCandidate, Settings, Totals};
pub use pricing::{derive, PriceQuote};
