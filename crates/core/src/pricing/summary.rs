use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::line_item::LineItem;
use crate::domain::support::SupportPlan;
use crate::pricing::aggregation::QuoteTotals;

/// Yearly platform subscription in base currency units.
pub const PLATFORM_FEE: Decimal = Decimal::from_parts(50_000, 0, 0, false, 0);

/// Inputs the summary is derived from besides the aggregated totals.
#[derive(Clone, Copy, Debug)]
pub struct SummaryInput<'a> {
    pub line_items: &'a [LineItem],
    pub commitment_years: u32,
    pub discount_percent: Decimal,
    pub currency: &'a str,
}

/// Client-facing snapshot of a priced quote. All amounts are base units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub has_sustainability: bool,
    pub has_security: bool,
    pub has_mobility: bool,
    pub has_insight: bool,
    pub support_plan: SupportPlan,

    pub yearly_platform_fee: Decimal,
    pub year_one_subscription: Decimal,
    pub year_two_onwards_subscription: Decimal,

    pub total_before_discount: Decimal,
    pub discount_amount: Decimal,
    pub final_total: Decimal,

    pub commitment_years: u32,
    pub discount_percent: Decimal,
    pub currency: String,
}

/// Strongest support tier among top-level items, 8x5 when none is stronger.
pub fn strongest_support_plan(items: &[LineItem]) -> SupportPlan {
    items.iter().map(|item| &item.leaf.support_plan).fold(
        SupportPlan::EightByFive,
        |strongest, plan| {
            if plan.strength() > strongest.strength() {
                plan.clone()
            } else {
                strongest
            }
        },
    )
}

pub fn generate_quote_summary(totals: &QuoteTotals, input: SummaryInput<'_>) -> QuoteSummary {
    // Inclusion flags look at top-level items only and are display-only.
    let any = |flag: fn(&LineItem) -> bool| input.line_items.iter().any(flag);

    let yearly = totals.grand_total.saturating_add(PLATFORM_FEE);
    let total_before_discount = yearly.saturating_mul(Decimal::from(input.commitment_years));
    let discount_amount =
        total_before_discount.saturating_mul(input.discount_percent / Decimal::ONE_HUNDRED);

    QuoteSummary {
        has_sustainability: any(|item| item.leaf.sustainability),
        has_security: any(|item| item.leaf.security),
        has_mobility: any(|item| item.leaf.mobility),
        has_insight: any(|item| item.leaf.insight),
        support_plan: strongest_support_plan(input.line_items),
        yearly_platform_fee: PLATFORM_FEE,
        year_one_subscription: yearly,
        year_two_onwards_subscription: yearly,
        total_before_discount,
        discount_amount,
        final_total: total_before_discount.saturating_sub(discount_amount),
        commitment_years: input.commitment_years,
        discount_percent: input.discount_percent,
        currency: input.currency.to_string(),
    }
}

/// Secondary figures the document layouts print next to the summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentBreakdown {
    /// Yearly subscription without the platform fee.
    pub subscription_yearly: Decimal,
    pub subscription_commitment_total: Decimal,
    pub platform_fee_commitment_total: Decimal,
    pub subscription_commitment_discounted: Decimal,
    pub platform_fee_commitment_discounted: Decimal,
    /// Price before discount per year of commitment.
    pub total_yearly: Decimal,
    pub discount_yearly: Decimal,
    pub yearly_equivalent: Decimal,
}

impl QuoteSummary {
    pub fn has_discount(&self) -> bool {
        self.discount_percent > Decimal::ZERO
    }

    pub fn shows_renewal_years(&self) -> bool {
        self.commitment_years > 1
    }

    pub fn commitment_breakdown(&self) -> CommitmentBreakdown {
        let years = Decimal::from(self.commitment_years);
        let keep = Decimal::ONE - self.discount_percent / Decimal::ONE_HUNDRED;
        let per_year = |amount: Decimal| if years.is_zero() { Decimal::ZERO } else { amount / years };

        let subscription_yearly = self.year_one_subscription.saturating_sub(self.yearly_platform_fee);
        let subscription_commitment_total = subscription_yearly.saturating_mul(years);
        let platform_fee_commitment_total = self.yearly_platform_fee.saturating_mul(years);

        CommitmentBreakdown {
            subscription_yearly,
            subscription_commitment_total,
            platform_fee_commitment_total,
            subscription_commitment_discounted: subscription_commitment_total.saturating_mul(keep),
            platform_fee_commitment_discounted: platform_fee_commitment_total.saturating_mul(keep),
            total_yearly: per_year(self.total_before_discount),
            discount_yearly: per_year(self.discount_amount),
            yearly_equivalent: per_year(self.final_total),
        }
    }
}
