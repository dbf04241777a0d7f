use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::line_item::{LineItem, LineItemKind};
use crate::pricing::line_item::{price_line_item, LineItemPricing};
use crate::pricing::rates::RateTables;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTotals {
    pub total_sustainability: Decimal,
    pub total_security: Decimal,
    pub total_mobility: Decimal,
    pub total_insight: Decimal,
    pub total_support: Decimal,
    pub grand_total: Decimal,
}

impl QuoteTotals {
    fn absorb(&mut self, pricing: &LineItemPricing) {
        self.total_sustainability = self.total_sustainability.saturating_add(pricing.sustainability_cost);
        self.total_security = self.total_security.saturating_add(pricing.security_cost);
        self.total_mobility = self.total_mobility.saturating_add(pricing.mobility_cost);
        self.total_insight = self.total_insight.saturating_add(pricing.insight_cost);
        self.total_support = self.total_support.saturating_add(pricing.support_cost);
        self.grand_total = self.grand_total.saturating_add(pricing.line_total);
    }

    fn merge(&mut self, other: &QuoteTotals) {
        self.total_sustainability = self.total_sustainability.saturating_add(other.total_sustainability);
        self.total_security = self.total_security.saturating_add(other.total_security);
        self.total_mobility = self.total_mobility.saturating_add(other.total_mobility);
        self.total_insight = self.total_insight.saturating_add(other.total_insight);
        self.total_support = self.total_support.saturating_add(other.total_support);
        self.grand_total = self.grand_total.saturating_add(other.grand_total);
    }
}

/// Priced view of one top-level line item for detail tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLinePricing {
    /// 1-based position in the quote.
    pub line_number: usize,
    /// Breakdown of the item itself; absent for buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own: Option<LineItemPricing>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LineItemPricing>,
    pub subtotal: QuoteTotals,
}

pub fn price_quote_line(line_number: usize, item: &LineItem, rates: &RateTables) -> QuoteLinePricing {
    let mut subtotal = QuoteTotals::default();
    match item.kind() {
        LineItemKind::Leaf(leaf) => {
            let own = price_line_item(leaf, rates);
            subtotal.absorb(&own);
            QuoteLinePricing { line_number, own: Some(own), children: Vec::new(), subtotal }
        }
        LineItemKind::Bucket { children, .. } => {
            let children: Vec<LineItemPricing> =
                children.iter().map(|child| price_line_item(child, rates)).collect();
            for child in &children {
                subtotal.absorb(child);
            }
            QuoteLinePricing { line_number, own: None, children, subtotal }
        }
    }
}

pub fn price_quote_lines(items: &[LineItem], rates: &RateTables) -> Vec<QuoteLinePricing> {
    items.iter().enumerate().map(|(index, item)| price_quote_line(index + 1, item, rates)).collect()
}

/// Quote-level totals. Buckets contribute only their children.
pub fn calculate_quote_totals(items: &[LineItem], rates: &RateTables) -> QuoteTotals {
    sum_lines(&price_quote_lines(items, rates))
}

pub fn sum_lines(lines: &[QuoteLinePricing]) -> QuoteTotals {
    lines.iter().fold(QuoteTotals::default(), |mut totals, line| {
        totals.merge(&line.subtotal);
        totals
    })
}
