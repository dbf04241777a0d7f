use std::path::Path;

use picaquote_core::config::LoadOptions;
use picaquote_core::pricing::evaluate_quote;
use picaquote_core::{CurrencyTable, FormatOptions, QuoteDocument, QuoteEvaluation};

use crate::commands::input::load_quote;
use crate::commands::rates::currency_table;
use crate::commands::{load_config, runtime, CommandResult, EXIT_CONFIG, EXIT_INPUT};

pub fn run(options: &LoadOptions, quote_path: &Path, json_output: bool) -> CommandResult {
    let config = match load_config("price", options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let rates = match config.load_rate_tables() {
        Ok(rates) => rates,
        Err(error) => {
            return CommandResult::failure("price", "rate_tables", error.to_string(), EXIT_CONFIG);
        }
    };

    let quote = match load_quote(quote_path) {
        Ok(quote) => quote,
        Err(error) => {
            return CommandResult::failure("price", "invalid_quote", format!("{error:#}"), EXIT_INPUT);
        }
    };

    let evaluation = evaluate_quote(&quote, &rates);

    if json_output {
        return match serde_json::to_string_pretty(&evaluation) {
            Ok(output) => CommandResult::raw(output),
            Err(error) => CommandResult::failure("price", "serialization", error.to_string(), 1),
        };
    }

    let runtime = match runtime("price") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let currencies = runtime.block_on(currency_table(&config));

    CommandResult::success("price", render_summary(&quote, &evaluation, &currencies))
}

fn render_summary(
    quote: &QuoteDocument,
    evaluation: &QuoteEvaluation,
    currencies: &CurrencyTable,
) -> String {
    let summary = &evaluation.summary;
    let currency = currencies.lookup(&summary.currency);
    let code = currency.currency().code.as_str();
    let money = |amount| currencies.format(amount, code, FormatOptions::decimals());

    let mut lines = vec![format!(
        "quote {} for {} ({}, {})",
        quote.quote_name.0,
        if quote.client_name.trim().is_empty() { "-" } else { quote.client_name.as_str() },
        quote.commitment_label(),
        currency.currency().label()
    )];
    if currency.is_fallback() {
        lines.push(format!("- currency `{}` is not configured, showing {code}", summary.currency));
    }

    lines.push(format!("- line items priced: {}", evaluation.lines.len()));
    lines.push(format!("- support plan: {}", summary.support_plan));
    lines.push(format!("- platform fee (yearly): {}", money(summary.yearly_platform_fee)));
    lines.push(format!("- year 1 subscription: {}", money(summary.year_one_subscription)));
    if summary.shows_renewal_years() {
        lines.push(format!(
            "- year 2 onwards subscription: {}",
            money(summary.year_two_onwards_subscription)
        ));
    }
    lines.push(format!("- total before discount: {}", money(summary.total_before_discount)));
    if summary.has_discount() {
        lines.push(format!(
            "- commitment discount ({}%): -{}",
            summary.discount_percent.normalize(),
            money(summary.discount_amount)
        ));
    }
    lines.push(format!("- final total: {}", money(summary.final_total)));

    lines.join("\n")
}
