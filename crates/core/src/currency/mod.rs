//! Currency table, conversion, formatting and the one-shot rate refresh.

pub mod format;
pub mod provider;
pub mod service;
pub mod table;

pub use format::{format_amount, FormatOptions};
pub use provider::{ExchangeRateApiProvider, RateProvider, RateRefreshError};
pub use service::{CurrencyService, RefreshOutcome};
pub use table::{Currency, CurrencyLookup, CurrencyTable, RateMerge};
