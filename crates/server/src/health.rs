use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use picaquote_core::{CurrencyService, CurrencyTable};
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    currencies: Arc<CurrencyService>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub currency_table: HealthCheck,
    pub checked_at: String,
}

pub fn router(currencies: Arc<CurrencyService>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { currencies })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let currency_table = currency_check(&*state.currencies.snapshot().await);

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "picaquote-server runtime initialized".to_string(),
        },
        currency_table,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

fn currency_check(table: &CurrencyTable) -> HealthCheck {
    HealthCheck {
        status: "ready",
        detail: format!("{} currencies loaded, base {}", table.codes().len(), table.base().code),
    }
}
