pub mod aggregation;
pub mod line_item;
pub mod rates;
pub mod summary;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::quote::QuoteDocument;

use self::{
    aggregation::{price_quote_lines, sum_lines, QuoteLinePricing, QuoteTotals},
    rates::RateTables,
    summary::{generate_quote_summary, QuoteSummary, SummaryInput},
};

/// Everything downstream consumers need from one pricing pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEvaluation {
    pub summary: QuoteSummary,
    pub totals: QuoteTotals,
    pub lines: Vec<QuoteLinePricing>,
}

pub trait PricingEngine: Send + Sync {
    fn rates(&self) -> &RateTables;

    fn evaluate(&self, quote: &QuoteDocument) -> QuoteEvaluation {
        evaluate_quote(quote, self.rates())
    }
}

#[derive(Clone, Debug, Default)]
pub struct DeterministicPricingEngine {
    rates: Arc<RateTables>,
}

impl DeterministicPricingEngine {
    pub fn new(rates: Arc<RateTables>) -> Self {
        Self { rates }
    }
}

impl PricingEngine for DeterministicPricingEngine {
    fn rates(&self) -> &RateTables {
        &self.rates
    }
}

pub fn evaluate_quote(quote: &QuoteDocument, rates: &RateTables) -> QuoteEvaluation {
    let lines = price_quote_lines(&quote.line_items, rates);
    let totals = sum_lines(&lines);
    let summary = generate_quote_summary(
        &totals,
        SummaryInput {
            line_items: &quote.line_items,
            commitment_years: quote.commitment_years,
            discount_percent: quote.effective_discount_percent(),
            currency: &quote.currency,
        },
    );

    QuoteEvaluation { summary, totals, lines }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{DeterministicPricingEngine, PricingEngine};
    use crate::domain::line_item::{LeafItem, LineItem};
    use crate::domain::quote::QuoteDocument;
    use crate::pricing::rates::RateTables;

    fn quote_fixture() -> QuoteDocument {
        let mut quote = QuoteDocument::new("Riyadh Holdings", "Q-2026-0001");
        quote.main_asset = "Building".to_string();
        quote.line_items.push(LineItem::from_leaf(LeafItem {
            size: dec!(2500),
            sustainability: true,
            ..LeafItem::new("li-1")
        }));
        quote
    }

    #[test]
    fn evaluation_combines_lines_totals_and_summary() {
        let engine = DeterministicPricingEngine::default();

        let evaluation = engine.evaluate(&quote_fixture());

        assert_eq!(evaluation.lines.len(), 1);
        assert_eq!(evaluation.totals.grand_total, evaluation.lines[0].subtotal.grand_total);
        assert_eq!(
            evaluation.summary.year_one_subscription,
            evaluation.totals.grand_total + dec!(50000)
        );
        assert!(evaluation.summary.has_sustainability);
        assert_eq!(evaluation.summary.currency, "USD");
    }

    #[test]
    fn commitment_lookup_supplies_discount_when_not_explicit() {
        let engine = DeterministicPricingEngine::default();
        let mut quote = quote_fixture();
        quote.commitment_years = 5;

        assert_eq!(engine.evaluate(&quote).summary.discount_percent, dec!(25));

        quote.discount_percent = Some(Decimal::ZERO);
        assert_eq!(engine.evaluate(&quote).summary.discount_amount, Decimal::ZERO);
    }

    #[test]
    fn oversized_quote_evaluates_without_panicking() {
        let quote: QuoteDocument = serde_json::from_str(
            r#"{
                "clientName": "Mega Campus",
                "quoteName": "Q-XL",
                "commitmentYears": 5,
                "lineItems": [{
                    "id": "li-1",
                    "assetType": "Data Centre",
                    "size": "10000000000000000000",
                    "quantity": 4000000000,
                    "sustainability": true
                }]
            }"#,
        )
        .expect("quote document");

        let evaluation = DeterministicPricingEngine::default().evaluate(&quote);

        assert_eq!(evaluation.totals.grand_total, Decimal::MAX);
        assert_eq!(evaluation.summary.total_before_discount, Decimal::MAX);
        assert!(evaluation.summary.final_total > Decimal::ZERO);
    }

    #[test]
    fn engine_uses_the_rate_tables_it_was_given() {
        let engine = DeterministicPricingEngine::new(Arc::new(RateTables {
            energy: Default::default(),
            security: Default::default(),
            mobility: Default::default(),
            support_plans: Default::default(),
        }));

        let evaluation = engine.evaluate(&quote_fixture());

        assert_eq!(evaluation.totals.grand_total, Decimal::ZERO);
        assert_eq!(evaluation.summary.final_total, dec!(50000));
    }
}
