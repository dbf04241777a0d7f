use std::sync::Arc;

use picaquote_core::config::{AppConfig, LoadOptions};
use picaquote_core::currency::ExchangeRateApiProvider;
use picaquote_core::{CurrencyService, CurrencyTable, RefreshOutcome};
use tracing::warn;

use crate::commands::{load_config, runtime, CommandResult, EXIT_CONFIG, EXIT_INTEGRATION};

pub fn run(options: &LoadOptions, refresh: bool) -> CommandResult {
    let config = match load_config("rates", options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    if !refresh {
        return CommandResult::success("rates", render_table(&CurrencyTable::default()));
    }

    let provider = match build_provider(&config) {
        Ok(provider) => provider,
        Err(result) => return result,
    };
    let runtime = match runtime("rates") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let service = CurrencyService::default();
    let outcome = runtime.block_on(service.refresh(&provider));
    let table = runtime.block_on(service.snapshot());

    match outcome {
        RefreshOutcome::Updated { updated, missing } => {
            let mut message = format!(
                "refreshed {} rate(s) from exchangerate-api\n{}",
                updated.len(),
                render_table(&table)
            );
            if !missing.is_empty() {
                message.push_str(&format!("\nkept configured rate for: {}", missing.join(", ")));
            }
            CommandResult::success("rates", message)
        }
        RefreshOutcome::Retained { reason } => CommandResult::failure(
            "rates",
            "rate_refresh",
            format!("rate refresh failed, configured rates unchanged: {reason}"),
            EXIT_INTEGRATION,
        ),
    }
}

fn build_provider(config: &AppConfig) -> Result<ExchangeRateApiProvider, CommandResult> {
    let Some(api_key) = config.currency.api_key.clone().filter(|_| config.currency.has_api_key())
    else {
        return Err(CommandResult::failure(
            "rates",
            "missing_api_key",
            "rate refresh requires currency.api_key (PICAQUOTE_CURRENCY_API_KEY)",
            EXIT_CONFIG,
        ));
    };

    ExchangeRateApiProvider::new(
        config.currency.api_base_url.clone(),
        api_key,
        config.currency.refresh_timeout(),
    )
    .map_err(|error| {
        CommandResult::failure("rates", "rate_refresh", error.to_string(), EXIT_INTEGRATION)
    })
}

/// Currency table for pricing commands, refreshed first when the
/// configuration asks for startup refresh.
pub(crate) async fn currency_table(config: &AppConfig) -> Arc<CurrencyTable> {
    let service = CurrencyService::default();
    if config.currency.refresh_on_startup {
        match build_provider(config) {
            Ok(provider) => {
                service.refresh(&provider).await;
            }
            Err(result) => warn!(
                event_name = "currency.refresh.skipped",
                output = %result.output,
                "rate refresh unavailable, using configured rates"
            ),
        }
    }
    service.snapshot().await
}

fn render_table(table: &CurrencyTable) -> String {
    table
        .iter()
        .map(|currency| {
            format!(
                "- {} rate {} per USD (symbol `{}`)",
                currency.label(),
                currency.rate.normalize(),
                currency.symbol
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
