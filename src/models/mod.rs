use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;
use crate::pricing::PriceQuote;
use crate::utils::parse_amount;

pub const COLUMN_ITEM_NAME: &str = "Item Name";
pub const COLUMN_QUANTITY: &str = "Quantity (kg)";
pub const COLUMN_PURCHASE_PRICE: &str = "Purchase Price/kg";
pub const COLUMN_MARGIN_VALUE: &str = "Margin Value";
pub const COLUMN_MARGIN_PERCENT: &str = "Margin %";
pub const COLUMN_SELLING_PRICE: &str = "Selling Price/kg";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginMode {
    FixedAmount,
    Percent,
    #[default]
    SellingPrice,
}

impl MarginMode {
    pub const ALL: [MarginMode; 3] = [
        MarginMode::FixedAmount,
        MarginMode::Percent,
        MarginMode::SellingPrice,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MarginMode::FixedAmount => "Fixed Amount",
            MarginMode::Percent => "%",
            MarginMode::SellingPrice => "Selling Price per kg",
        }
    }

    /// Grid columns shown while this mode is selected, in display order.
    pub fn columns(self) -> [&'static str; 4] {
        let margin_column = match self {
            MarginMode::FixedAmount => COLUMN_MARGIN_VALUE,
            MarginMode::Percent => COLUMN_MARGIN_PERCENT,
            MarginMode::SellingPrice => COLUMN_SELLING_PRICE,
        };
        [
            COLUMN_ITEM_NAME,
            COLUMN_QUANTITY,
            COLUMN_PURCHASE_PRICE,
            margin_column,
        ]
    }
}

impl fmt::Display for MarginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MarginMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let raw = value.trim();
        match raw.to_ascii_lowercase().as_str() {
            "fixed amount" | "fixed" | "fixed_amount" | "amount" => Ok(MarginMode::FixedAmount),
            "%" | "percent" | "percentage" => Ok(MarginMode::Percent),
            "selling price per kg" | "selling" | "selling_price" | "selling price" => {
                Ok(MarginMode::SellingPrice)
            }
            _ => Err(Error::UnknownMarginMode(raw.to_string())),
        }
    }
}

/// The one margin figure a row carries, tagged by how it is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MarginInput {
    FixedAmount { margin_value: f64 },
    Percent { margin_percent: f64 },
    SellingPrice { selling_price: f64 },
}

impl MarginInput {
    pub fn new(mode: MarginMode, value: f64) -> Self {
        match mode {
            MarginMode::FixedAmount => MarginInput::FixedAmount { margin_value: value },
            MarginMode::Percent => MarginInput::Percent { margin_percent: value },
            MarginMode::SellingPrice => MarginInput::SellingPrice { selling_price: value },
        }
    }

    pub fn mode(&self) -> MarginMode {
        match self {
            MarginInput::FixedAmount { .. } => MarginMode::FixedAmount,
            MarginInput::Percent { .. } => MarginMode::Percent,
            MarginInput::SellingPrice { .. } => MarginMode::SellingPrice,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            MarginInput::FixedAmount { margin_value } => margin_value,
            MarginInput::Percent { margin_percent } => margin_percent,
            MarginInput::SellingPrice { selling_price } => selling_price,
        }
    }
}

/// One grid row as typed by the user. Every cell may be missing or blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub item_name: Option<String>,
    pub quantity: Option<String>,
    pub purchase_price: Option<String>,
    pub margin_value: Option<String>,
    pub margin_percent: Option<String>,
    pub selling_price: Option<String>,
}

impl RawRow {
    /// Builds a row that fills only the margin column `mode` reads.
    pub fn for_mode(
        mode: MarginMode,
        item_name: &str,
        quantity: &str,
        purchase_price: &str,
        margin: &str,
    ) -> Self {
        let mut row = RawRow {
            item_name: Some(item_name.to_string()),
            quantity: Some(quantity.to_string()),
            purchase_price: Some(purchase_price.to_string()),
            ..RawRow::default()
        };
        let margin = Some(margin.to_string());
        match mode {
            MarginMode::FixedAmount => row.margin_value = margin,
            MarginMode::Percent => row.margin_percent = margin,
            MarginMode::SellingPrice => row.selling_price = margin,
        }
        row
    }

    pub fn to_candidate(&self, mode: MarginMode) -> RowCandidate {
        let margin_cell = match mode {
            MarginMode::FixedAmount => &self.margin_value,
            MarginMode::Percent => &self.margin_percent,
            MarginMode::SellingPrice => &self.selling_price,
        };
        RowCandidate {
            item_name: self.item_name.as_deref().unwrap_or_default().trim().to_string(),
            quantity: parse_amount(self.quantity.as_deref()),
            purchase_price: parse_amount(self.purchase_price.as_deref()),
            margin: MarginInput::new(mode, parse_amount(margin_cell.as_deref())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowCandidate {
    pub item_name: String,
    pub quantity: f64,
    pub purchase_price: f64,
    pub margin: MarginInput,
}

impl RowCandidate {
    pub fn is_blank(&self) -> bool {
        self.item_name.trim().is_empty()
    }
}

/// A priced row inside an order. Totals are always recomputed from quantity and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    item_name: String,
    quantity: f64,
    purchase_price: f64,
    margin: MarginInput,
    selling_price: f64,
    margin_value: f64,
}

impl LineItem {
    pub(crate) fn new(candidate: RowCandidate, quote: PriceQuote) -> Self {
        LineItem {
            item_name: candidate.item_name,
            quantity: candidate.quantity,
            purchase_price: candidate.purchase_price,
            margin: candidate.margin,
            selling_price: quote.selling_price,
            margin_value: quote.margin_value,
        }
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn purchase_price(&self) -> f64 {
        self.purchase_price
    }

    pub fn margin(&self) -> MarginInput {
        self.margin
    }

    pub fn margin_mode(&self) -> MarginMode {
        self.margin.mode()
    }

    pub fn selling_price(&self) -> f64 {
        self.selling_price
    }

    /// Absolute margin per kg, whatever mode the row was entered in.
    pub fn margin_value(&self) -> f64 {
        self.margin_value
    }

    pub fn total_buy(&self) -> f64 {
        self.quantity * self.purchase_price
    }

    pub fn total_sell(&self) -> f64 {
        self.quantity * self.selling_price
    }

    pub fn profit(&self) -> f64 {
        self.total_sell() - self.total_buy()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    created_at: DateTime<Local>,
    items: Vec<LineItem>,
}

impl Order {
    pub(crate) fn new(items: Vec<LineItem>, created_at: DateTime<Local>) -> Self {
        debug_assert!(!items.is_empty());
        Order {
            id: Uuid::new_v4(),
            created_at,
            items,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn totals(&self) -> Totals {
        Totals::from_items(self.items.iter())
    }
}

/// Buy/sell sums with profit derived from them. Only built through `new` or
/// `from_items`, so `total_profit == total_sell - total_buy` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    total_buy: f64,
    total_sell: f64,
    total_profit: f64,
}

impl Totals {
    pub fn new(total_buy: f64, total_sell: f64) -> Self {
        Totals {
            total_buy,
            total_sell,
            total_profit: total_sell - total_buy,
        }
    }

    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> Self {
        let (buy, sell) = items.into_iter().fold((0.0, 0.0), |(buy, sell), item| {
            (buy + item.total_buy(), sell + item.total_sell())
        });
        Totals::new(buy, sell)
    }

    pub fn total_buy(&self) -> f64 {
        self.total_buy
    }

    pub fn total_sell(&self) -> f64 {
        self.total_sell
    }

    pub fn total_profit(&self) -> f64 {
        self.total_profit
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemSummary {
    pub item_name: String,
    pub margin_mode: MarginMode,
    pub quantity: f64,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub margin_value: f64,
    pub total_buy: f64,
    pub total_sell: f64,
    pub profit: f64,
}

impl From<&LineItem> for LineItemSummary {
    fn from(item: &LineItem) -> Self {
        LineItemSummary {
            item_name: item.item_name.clone(),
            margin_mode: item.margin_mode(),
            quantity: item.quantity,
            purchase_price: item.purchase_price,
            selling_price: item.selling_price,
            margin_value: item.margin_value,
            total_buy: item.total_buy(),
            total_sell: item.total_sell(),
            profit: item.profit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub id: Uuid,
    pub created_at: String,
    pub items: Vec<LineItemSummary>,
    pub totals: Totals,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        OrderSummary {
            id: order.id,
            created_at: order.created_at.to_rfc3339(),
            items: order.items.iter().map(LineItemSummary::from).collect(),
            totals: order.totals(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    pub orders: Vec<OrderSummary>,
    pub totals: Totals,
}

/// A staged row with its derived prices, shown for review before submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPreview {
    pub item_name: String,
    pub quantity: f64,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub margin_value: f64,
    pub profit_per_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub default_margin_mode: MarginMode,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_margin_mode: MarginMode::default(),
            log_level: "info".to_string(),
        }
    }
}
