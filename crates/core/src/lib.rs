//! Pricing engine for smart-infrastructure subscription quotes.
//!
//! Quote documents are owned by the caller and passed by reference into pure
//! pricing functions; the only shared mutable state is the currency table
//! behind [`currency::CurrencyService`].

pub mod config;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use currency::{
    Currency, CurrencyLookup, CurrencyService, CurrencyTable, FormatOptions, RateProvider,
    RefreshOutcome,
};
pub use domain::line_item::{LeafItem, LineItem, LineItemId, LineItemKind, SubLineItem};
pub use domain::quote::{QuoteDocument, QuoteId};
pub use domain::support::SupportPlan;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::aggregation::{QuoteLinePricing, QuoteTotals};
pub use pricing::line_item::LineItemPricing;
pub use pricing::rates::RateTables;
pub use pricing::summary::{CommitmentBreakdown, QuoteSummary};
pub use pricing::{DeterministicPricingEngine, PricingEngine, QuoteEvaluation};
