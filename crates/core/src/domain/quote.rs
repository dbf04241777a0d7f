use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog;
use crate::domain::line_item::LineItem;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(pub String);

/// Working quote owned by the caller.
///
/// The engine only ever borrows it; every figure derived from it is
/// recomputed on demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocument {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub quote_name: QuoteId,
    #[serde(default = "today")]
    pub quote_date: NaiveDate,
    #[serde(default)]
    pub main_asset: String,
    #[serde(default = "default_commitment_years")]
    pub commitment_years: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn default_commitment_years() -> u32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Conventional discount for a commitment length: 1 → 0%, 3 → 15%, 5 → 25%.
pub fn default_discount_percent(commitment_years: u32) -> Decimal {
    match commitment_years {
        3 => Decimal::from(15),
        5 => Decimal::from(25),
        _ => Decimal::ZERO,
    }
}

impl QuoteDocument {
    pub fn new(client_name: impl Into<String>, quote_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            quote_name: QuoteId(quote_name.into()),
            quote_date: today(),
            main_asset: String::new(),
            commitment_years: default_commitment_years(),
            discount_percent: None,
            currency: default_currency(),
            line_items: Vec::new(),
        }
    }

    /// Changes the commitment period and resets the discount to the
    /// conventional value for it.
    pub fn set_commitment_years(&mut self, years: u32) {
        self.commitment_years = years;
        self.discount_percent = Some(default_discount_percent(years));
    }

    pub fn effective_discount_percent(&self) -> Decimal {
        self.discount_percent.unwrap_or_else(|| default_discount_percent(self.commitment_years))
    }

    pub fn is_hierarchical(&self) -> bool {
        catalog::is_hierarchical(&self.main_asset)
    }

    pub fn commitment_label(&self) -> String {
        let suffix = if self.commitment_years > 1 { "s" } else { "" };
        format!("{} Year{suffix}", self.commitment_years)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{default_discount_percent, QuoteDocument};

    #[test]
    fn discount_lookup_covers_conventional_terms() {
        assert_eq!(default_discount_percent(1), Decimal::ZERO);
        assert_eq!(default_discount_percent(3), dec!(15));
        assert_eq!(default_discount_percent(5), dec!(25));
        assert_eq!(default_discount_percent(2), Decimal::ZERO);
        assert_eq!(default_discount_percent(10), Decimal::ZERO);
    }

    #[test]
    fn explicit_discount_overrides_lookup() {
        let mut quote = QuoteDocument::new("Acme", "Q-1");
        quote.commitment_years = 3;
        assert_eq!(quote.effective_discount_percent(), dec!(15));

        quote.discount_percent = Some(dec!(7.5));
        assert_eq!(quote.effective_discount_percent(), dec!(7.5));

        quote.set_commitment_years(5);
        assert_eq!(quote.effective_discount_percent(), dec!(25));
    }

    #[test]
    fn parses_minimal_document_with_defaults() {
        let quote: QuoteDocument =
            serde_json::from_str(r#"{"clientName":"Acme","mainAsset":"City"}"#).expect("parse");

        assert_eq!(quote.commitment_years, 1);
        assert_eq!(quote.currency, "USD");
        assert!(quote.line_items.is_empty());
        assert!(quote.is_hierarchical());
        assert_eq!(quote.commitment_label(), "1 Year");
    }
}
