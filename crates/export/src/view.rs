use picaquote_core::currency::FormatOptions;
use picaquote_core::domain::line_item::LeafItem;
use picaquote_core::{CurrencyTable, QuoteDocument, QuoteEvaluation};
use rust_decimal::Decimal;
use serde::Serialize;

pub const VALIDITY_NOTE: &str = "This quote is valid for 30 days from the date of issue.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModuleRow {
    pub name: &'static str,
    pub included: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiscountRow {
    pub label: String,
    pub yearly: String,
    pub total: String,
}

/// One row of the line item detail table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineRow {
    pub label: String,
    pub asset: String,
    pub description: String,
    pub size: Decimal,
    pub quantity: u32,
    pub sustainability: bool,
    pub security: bool,
    pub security_channels: u32,
    pub mobility: bool,
    pub mobility_channels: u32,
    pub insight: bool,
    pub support_plan: String,
    pub is_child: bool,
}

/// Display-ready figures for one quote, already converted and formatted in
/// the quote currency.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClientQuoteView {
    pub company_name: String,
    pub quote_name: String,
    pub quote_date: String,
    pub client_name: String,
    pub main_asset: String,
    pub commitment_years: u32,
    pub commitment_label: String,
    pub currency_code: String,
    pub currency_label: String,

    pub modules: Vec<ModuleRow>,
    pub support_plan: String,

    pub platform_fee_yearly: String,
    pub platform_fee_commitment_total: String,
    pub platform_fee_commitment_discounted: String,
    pub year_one_total: String,
    /// Present only for multi-year commitments.
    pub year_two_onwards: Option<String>,
    pub subscription_yearly: String,
    pub subscription_commitment_total: String,
    pub subscription_commitment_discounted: String,
    pub total_yearly: String,
    pub total_before_discount: String,
    pub discount: Option<DiscountRow>,
    pub final_total: String,
    pub yearly_equivalent: String,

    pub line_rows: Vec<LineRow>,
}

impl ClientQuoteView {
    pub fn build(
        quote: &QuoteDocument,
        evaluation: &QuoteEvaluation,
        currencies: &CurrencyTable,
        company_name: &str,
    ) -> Self {
        let summary = &evaluation.summary;
        let breakdown = summary.commitment_breakdown();
        let currency = currencies.get(&summary.currency);
        let money =
            |amount: Decimal| currencies.format(amount, &currency.code, FormatOptions::decimals());

        let discount = summary.has_discount().then(|| DiscountRow {
            label: format!("Commitment Discount ({}%)", summary.discount_percent.normalize()),
            yearly: money(breakdown.discount_yearly),
            total: money(summary.discount_amount),
        });

        Self {
            company_name: company_name.to_string(),
            quote_name: quote.quote_name.0.clone(),
            quote_date: quote.quote_date.format("%B %-d, %Y").to_string(),
            client_name: or_dash(&quote.client_name),
            main_asset: or_dash(&quote.main_asset),
            commitment_years: summary.commitment_years,
            commitment_label: quote.commitment_label(),
            currency_code: currency.code.clone(),
            currency_label: currency.label(),
            modules: vec![
                ModuleRow { name: "Sustainability", included: summary.has_sustainability },
                ModuleRow { name: "Security", included: summary.has_security },
                ModuleRow { name: "Mobility", included: summary.has_mobility },
                ModuleRow { name: "Insight", included: summary.has_insight },
            ],
            support_plan: summary.support_plan.to_string(),
            platform_fee_yearly: money(summary.yearly_platform_fee),
            platform_fee_commitment_total: money(breakdown.platform_fee_commitment_total),
            platform_fee_commitment_discounted: money(breakdown.platform_fee_commitment_discounted),
            year_one_total: money(summary.year_one_subscription),
            year_two_onwards: summary
                .shows_renewal_years()
                .then(|| money(summary.year_two_onwards_subscription)),
            subscription_yearly: money(breakdown.subscription_yearly),
            subscription_commitment_total: money(breakdown.subscription_commitment_total),
            subscription_commitment_discounted: money(breakdown.subscription_commitment_discounted),
            total_yearly: money(breakdown.total_yearly),
            total_before_discount: money(summary.total_before_discount),
            discount,
            final_total: money(summary.final_total),
            yearly_equivalent: money(breakdown.yearly_equivalent),
            line_rows: line_rows(quote),
        }
    }

    pub fn currency_note(&self) -> String {
        format!("All prices in {}", self.currency_label)
    }

    pub fn tax_note(&self) -> String {
        format!("All prices are in {} and exclude applicable taxes.", self.currency_label)
    }
}

fn line_rows(quote: &QuoteDocument) -> Vec<LineRow> {
    let mut rows = Vec::new();
    for (index, item) in quote.line_items.iter().enumerate() {
        rows.push(LineRow {
            label: format!("Line Item {}", index + 1),
            asset: item.display_asset().to_string(),
            ..leaf_row(&item.leaf)
        });
        for (child_index, child) in item.sub_line_items.iter().enumerate() {
            rows.push(LineRow {
                label: format!("  └─ Sub {}", child_index + 1),
                is_child: true,
                ..leaf_row(child)
            });
        }
    }
    rows
}

fn leaf_row(leaf: &LeafItem) -> LineRow {
    LineRow {
        label: String::new(),
        asset: or_dash(&leaf.asset_type),
        description: or_dash(&leaf.description),
        size: leaf.size.normalize(),
        quantity: leaf.quantity,
        sustainability: leaf.sustainability,
        security: leaf.security,
        security_channels: leaf.security_channels,
        mobility: leaf.mobility,
        mobility_channels: leaf.mobility_channels,
        insight: leaf.insight,
        support_plan: or_dash(leaf.support_plan.as_str()),
        is_child: false,
    }
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
