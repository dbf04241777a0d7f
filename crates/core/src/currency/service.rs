use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::currency::provider::RateProvider;
use crate::currency::table::CurrencyTable;

/// What a refresh did to the shared table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated { updated: Vec<String>, missing: Vec<String> },
    /// The provider failed; the previous table is still in place.
    Retained { reason: String },
}

/// Shared currency table that can be swapped for a refreshed copy.
///
/// Readers take an `Arc` snapshot and keep using it for the whole
/// calculation, so a refresh landing midway never mixes old and new rates.
#[derive(Debug, Default)]
pub struct CurrencyService {
    table: RwLock<Arc<CurrencyTable>>,
}

impl CurrencyService {
    pub fn new(table: CurrencyTable) -> Self {
        Self { table: RwLock::new(Arc::new(table)) }
    }

    pub async fn snapshot(&self) -> Arc<CurrencyTable> {
        Arc::clone(&*self.table.read().await)
    }

    pub async fn replace(&self, table: CurrencyTable) {
        *self.table.write().await = Arc::new(table);
    }

    /// One-shot refresh from `provider`. Failures are logged and leave the
    /// current table untouched.
    pub async fn refresh(&self, provider: &dyn RateProvider) -> RefreshOutcome {
        let rates = match provider.fetch_usd_rates().await {
            Ok(rates) => rates,
            Err(refresh_error) => {
                error!(
                    event_name = "currency.refresh.failed",
                    correlation_id = "rate_refresh",
                    provider = provider.name(),
                    error = %refresh_error,
                    "exchange rate refresh failed, keeping configured rates"
                );
                return RefreshOutcome::Retained { reason: refresh_error.to_string() };
            }
        };

        let current = self.snapshot().await;
        let merge = current.merge_rates(&rates);
        for code in &merge.missing {
            warn!(
                event_name = "currency.refresh.rate_missing",
                correlation_id = "rate_refresh",
                provider = provider.name(),
                currency = %code,
                "rate not provided, keeping existing rate"
            );
        }

        self.replace(merge.table).await;
        info!(
            event_name = "currency.refresh.applied",
            correlation_id = "rate_refresh",
            provider = provider.name(),
            updated = merge.updated.len(),
            missing = merge.missing.len(),
            "exchange rates refreshed"
        );

        RefreshOutcome::Updated { updated: merge.updated, missing: merge.missing }
    }
}
