use serde::{Deserialize, Serialize};

use crate::models::{LineItem, MarginInput, RowCandidate, RowPreview};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub selling_price: f64,
    /// Absolute margin per kg.
    pub margin_value: f64,
    pub profit_per_kg: f64,
}

/// Fills in the selling price and absolute margin from the purchase price and
/// whichever margin figure the row was entered with. Negative inputs pass through.
pub fn derive(purchase_price: f64, margin: MarginInput) -> PriceQuote {
    let selling_price = match margin {
        MarginInput::FixedAmount { margin_value } => purchase_price + margin_value,
        MarginInput::Percent { margin_percent } => purchase_price * (1.0 + margin_percent / 100.0),
        MarginInput::SellingPrice { selling_price } => selling_price,
    };
    let margin_value = match margin {
        MarginInput::FixedAmount { margin_value } => margin_value,
        _ => selling_price - purchase_price,
    };
    PriceQuote {
        selling_price,
        margin_value,
        profit_per_kg: selling_price - purchase_price,
    }
}

pub fn price_row(candidate: RowCandidate) -> LineItem {
    let quote = derive(candidate.purchase_price, candidate.margin);
    LineItem::new(candidate, quote)
}

pub fn preview_row(candidate: &RowCandidate) -> RowPreview {
    let quote = derive(candidate.purchase_price, candidate.margin);
    RowPreview {
        item_name: candidate.item_name.clone(),
        quantity: candidate.quantity,
        purchase_price: candidate.purchase_price,
        selling_price: quote.selling_price,
        margin_value: quote.margin_value,
        profit_per_kg: quote.profit_per_kg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarginMode;
    use crate::utils::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_amount_adds_margin() {
        let quote = derive(20.0, MarginInput::FixedAmount { margin_value: 5.0 });
        assert_eq!(quote.selling_price, 25.0);
        assert_eq!(quote.margin_value, 5.0);
        assert_eq!(quote.profit_per_kg, 5.0);
    }

    #[test]
    fn test_percent_scales_purchase_price() {
        let quote = derive(40.0, MarginInput::Percent { margin_percent: 25.0 });
        assert_eq!(quote.selling_price, 50.0);
        assert_eq!(quote.margin_value, 10.0);
    }

    #[test]
    fn test_selling_price_is_taken_as_given() {
        let quote = derive(18.0, MarginInput::SellingPrice { selling_price: 15.0 });
        assert_eq!(quote.selling_price, 15.0);
        assert_eq!(quote.margin_value, -3.0);
        assert_eq!(quote.profit_per_kg, -3.0);
    }

    #[test]
    fn test_zero_inputs_yield_zero_quote() {
        for mode in MarginMode::ALL {
            let quote = derive(0.0, MarginInput::new(mode, 0.0));
            assert_eq!(quote.selling_price, 0.0);
            assert_eq!(quote.margin_value, 0.0);
        }
    }

    #[test]
    fn test_price_row_keeps_candidate_fields() {
        let item = price_row(RowCandidate {
            item_name: "Tomato".to_string(),
            quantity: 10.0,
            purchase_price: 20.0,
            margin: MarginInput::FixedAmount { margin_value: 5.0 },
        });
        assert_eq!(item.item_name(), "Tomato");
        assert_eq!(item.selling_price(), 25.0);
        assert_eq!(item.total_buy(), 200.0);
        assert_eq!(item.total_sell(), 250.0);
        assert_eq!(item.profit(), 50.0);
        assert_eq!(item.margin_mode(), MarginMode::FixedAmount);
    }

    proptest! {
        #[test]
        fn test_percent_mode_property(p in -1_000.0f64..1_000.0, m in -100.0f64..500.0) {
            let quote = derive(p, MarginInput::Percent { margin_percent: m });
            prop_assert!(approx_eq(quote.selling_price, p * (1.0 + m / 100.0)));
            prop_assert!(approx_eq(quote.margin_value, quote.selling_price - p));
        }

        #[test]
        fn test_margin_value_matches_profit_per_kg(
            p in 0.0f64..1_000.0,
            v in 0.0f64..1_000.0,
            mode_idx in 0usize..3,
        ) {
            let quote = derive(p, MarginInput::new(MarginMode::ALL[mode_idx], v));
            prop_assert!(approx_eq(quote.margin_value, quote.profit_per_kg));
        }
    }
}
