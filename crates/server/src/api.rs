use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use picaquote_core::domain::catalog::{HIERARCHICAL_MAIN_ASSETS, MAIN_ASSETS};
use picaquote_core::{
    ApplicationError, Currency, DomainError, InterfaceError, PricingEngine, QuoteDocument,
    QuoteEvaluation,
};
use picaquote_export::{ClientQuoteView, ExportFormat};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::bootstrap::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub main_assets: Vec<&'static str>,
    pub hierarchical_main_assets: Vec<&'static str>,
    pub asset_types: Vec<String>,
    pub support_plans: Vec<String>,
    pub currencies: Vec<Currency>,
    pub default_currency: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

/// HTTP face of [`InterfaceError`].
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::ExportFailed { .. } | InterfaceError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let detail = match &self.0 {
            InterfaceError::BadRequest { message, .. } => message.clone(),
            _ => String::new(),
        };
        let body = ErrorBody {
            error: self.0.user_message(),
            detail,
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/catalog", get(catalog))
        .route("/api/v1/quotes/summary", post(quote_summary))
        .route("/api/v1/quotes/export/pdf", post(export_pdf))
        .route("/api/v1/quotes/export/xlsx", post(export_xlsx))
        .with_state(state)
}

async fn catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let rates = state.pricing.rates();
    let currencies = state.currencies.snapshot().await;

    Json(CatalogResponse {
        main_assets: MAIN_ASSETS.to_vec(),
        hierarchical_main_assets: HIERARCHICAL_MAIN_ASSETS.to_vec(),
        asset_types: rates.asset_types().into_iter().map(str::to_string).collect(),
        support_plans: rates.support_plans().into_iter().map(str::to_string).collect(),
        currencies: currencies.iter().cloned().collect(),
        default_currency: state.default_currency.to_string(),
    })
}

async fn quote_summary(
    State(state): State<AppState>,
    payload: Result<Json<QuoteDocument>, JsonRejection>,
) -> Result<Json<QuoteEvaluation>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let quote = parse_quote(payload, &correlation_id)?;

    let evaluation = state.pricing.evaluate(&quote);
    info!(
        event_name = "quote.summary.computed",
        correlation_id = %correlation_id,
        quote_id = %quote.quote_name.0,
        line_items = quote.line_items.len(),
        "quote summary computed"
    );

    Ok(Json(evaluation))
}

async fn export_pdf(
    State(state): State<AppState>,
    payload: Result<Json<QuoteDocument>, JsonRejection>,
) -> Result<Response, ApiError> {
    export(state, payload, ExportFormat::Pdf).await
}

async fn export_xlsx(
    State(state): State<AppState>,
    payload: Result<Json<QuoteDocument>, JsonRejection>,
) -> Result<Response, ApiError> {
    export(state, payload, ExportFormat::Xlsx).await
}

async fn export(
    state: AppState,
    payload: Result<Json<QuoteDocument>, JsonRejection>,
    format: ExportFormat,
) -> Result<Response, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let quote = parse_quote(payload, &correlation_id)?;

    let evaluation = state.pricing.evaluate(&quote);
    let currencies = state.currencies.snapshot().await;
    let view = ClientQuoteView::build(&quote, &evaluation, &currencies, &state.company_name);

    let artifact = state.exporter.export(format, &view).await.map_err(|error| {
        ApiError(ApplicationError::Export(error.to_string()).into_interface(correlation_id.as_str()))
    })?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name(&view.quote_name));
    let content_type = artifact.content_type();
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type.to_string()), (header::CONTENT_DISPOSITION, disposition)],
        artifact.into_bytes(),
    )
        .into_response())
}

fn parse_quote(
    payload: Result<Json<QuoteDocument>, JsonRejection>,
    correlation_id: &str,
) -> Result<QuoteDocument, ApiError> {
    match payload {
        Ok(Json(quote)) => Ok(quote),
        Err(rejection) => {
            warn!(
                event_name = "quote.request.rejected",
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "quote document rejected"
            );
            let error = ApplicationError::from(DomainError::InvalidQuoteDocument(rejection.body_text()));
            Err(ApiError(error.into_interface(correlation_id)))
        }
    }
}
