use std::sync::Arc;

use picaquote_core::config::{AppConfig, ConfigError, CurrencyConfig};
use picaquote_core::currency::ExchangeRateApiProvider;
use picaquote_core::{CurrencyService, DeterministicPricingEngine, RefreshOutcome};
use picaquote_export::{ExportError, PdfGenerator, QuoteExporter};
use thiserror::Error;
use tracing::{info, warn};

/// Shared handler state. Cloning is cheap; everything heavy sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pricing: Arc<DeterministicPricingEngine>,
    pub currencies: Arc<CurrencyService>,
    pub exporter: Arc<QuoteExporter>,
    pub company_name: Arc<str>,
    pub default_currency: Arc<str>,
}

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("rate tables could not be loaded: {0}")]
    RateTables(#[source] ConfigError),
    #[error("quote exporter could not be initialized: {0}")]
    Export(#[from] ExportError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let rates = config.load_rate_tables().map_err(BootstrapError::RateTables)?;
    info!(
        event_name = "system.bootstrap.rates_loaded",
        correlation_id = "bootstrap",
        asset_types = rates.asset_types().len(),
        source = config
            .pricing
            .rates_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        "rate tables loaded"
    );

    let pdf = PdfGenerator::from_config(
        config.export.template_dir.as_deref(),
        config.export.wkhtmltopdf_path.clone(),
    )?;

    let currencies = Arc::new(CurrencyService::default());
    if config.currency.refresh_on_startup {
        tokio::spawn(refresh_rates_on_startup(config.currency.clone(), currencies.clone()));
    }

    let state = AppState {
        pricing: Arc::new(DeterministicPricingEngine::new(Arc::new(rates))),
        currencies,
        exporter: Arc::new(QuoteExporter::new(pdf)),
        company_name: Arc::from(config.export.company_name.as_str()),
        default_currency: Arc::from(config.currency.default_code.as_str()),
    };

    Ok(Application { config, state })
}

/// One-shot refresh running beside the listener. Requests keep pricing with
/// the built-in rates until the swap lands; a failure keeps them for good.
async fn refresh_rates_on_startup(currency: CurrencyConfig, currencies: Arc<CurrencyService>) {
    let Some(api_key) = currency.api_key.clone() else {
        warn!(
            event_name = "currency.refresh.skipped",
            correlation_id = "bootstrap",
            "startup refresh enabled without an api key"
        );
        return;
    };

    let provider = match ExchangeRateApiProvider::new(
        currency.api_base_url.clone(),
        api_key,
        currency.refresh_timeout(),
    ) {
        Ok(provider) => provider,
        Err(error) => {
            warn!(
                event_name = "currency.refresh.skipped",
                correlation_id = "bootstrap",
                error = %error,
                "rate provider could not be built"
            );
            return;
        }
    };

    if let RefreshOutcome::Updated { updated, .. } = currencies.refresh(&provider).await {
        info!(
            event_name = "system.bootstrap.rates_refreshed",
            correlation_id = "bootstrap",
            updated = updated.len(),
            "startup rate refresh applied"
        );
    }
}
