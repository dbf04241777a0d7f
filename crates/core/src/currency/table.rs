use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::format::{format_amount, FormatOptions};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    /// Prefix written before formatted amounts, spacing included.
    pub symbol: String,
    /// Units of this currency per one USD.
    pub rate: Decimal,
}

impl Currency {
    pub fn new(code: &str, name: &str, symbol: &str, rate: Decimal) -> Self {
        Self { code: code.to_string(), name: name.to_string(), symbol: symbol.to_string(), rate }
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.code, self.name)
    }
}

/// Result of resolving a currency code against a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrencyLookup<'a> {
    Found(&'a Currency),
    /// The code is not configured; the base currency stands in for it.
    Fallback(&'a Currency),
}

impl<'a> CurrencyLookup<'a> {
    pub fn currency(self) -> &'a Currency {
        match self {
            Self::Found(currency) | Self::Fallback(currency) => currency,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Immutable set of currencies. The first entry is the base every amount is
/// computed in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CurrencyTable {
    base: Currency,
    others: Vec<Currency>,
}

/// Outcome of merging provider rates into a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateMerge {
    pub table: CurrencyTable,
    pub updated: Vec<String>,
    pub missing: Vec<String>,
}

impl Default for CurrencyTable {
    fn default() -> Self {
        let rate = |units: i64, scale: u32| Decimal::new(units, scale);
        Self {
            base: Currency::new("USD", "US Dollar", "$", Decimal::ONE),
            others: vec![
                Currency::new("SAR", "Saudi Riyal", "SAR ", rate(375, 2)),
                Currency::new("KWD", "Kuwaiti Dinar", "KWD ", rate(3061, 4)),
                Currency::new("AED", "UAE Dirham", "AED ", rate(367, 2)),
                Currency::new("QAR", "Qatari Riyal", "QAR ", rate(364, 2)),
                Currency::new("OMR", "Omani Rial", "OMR ", rate(3845, 4)),
                Currency::new("BHD", "Bahraini Dinar", "BHD ", rate(376, 3)),
                Currency::new("JOD", "Jordanian Dinar", "JOD ", rate(709, 3)),
                Currency::new("CAD", "Canadian Dollar", "C$", rate(135, 2)),
            ],
        }
    }
}

impl CurrencyTable {
    pub fn new(currencies: Vec<Currency>) -> Result<Self, DomainError> {
        let mut iter = currencies.into_iter();
        let base = iter.next().ok_or_else(|| {
            DomainError::InvariantViolation("currency table must not be empty".to_string())
        })?;
        if base.rate != Decimal::ONE {
            return Err(DomainError::InvariantViolation(format!(
                "base currency `{}` must have rate 1",
                base.code
            )));
        }
        Ok(Self { base, others: iter.collect() })
    }

    pub fn base(&self) -> &Currency {
        &self.base
    }

    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        std::iter::once(&self.base).chain(self.others.iter())
    }

    pub fn codes(&self) -> Vec<&str> {
        self.iter().map(|currency| currency.code.as_str()).collect()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.iter().any(|currency| currency.code == code)
    }

    pub fn lookup(&self, code: &str) -> CurrencyLookup<'_> {
        match self.iter().find(|currency| currency.code == code) {
            Some(currency) => CurrencyLookup::Found(currency),
            None => CurrencyLookup::Fallback(&self.base),
        }
    }

    /// Currency for `code`, or the base currency when it is not configured.
    pub fn get(&self, code: &str) -> &Currency {
        self.lookup(code).currency()
    }

    pub fn rate(&self, code: &str) -> Decimal {
        self.get(code).rate
    }

    pub fn convert_from_base(&self, amount: Decimal, code: &str) -> Decimal {
        amount.saturating_mul(self.rate(code))
    }

    pub fn convert_to_base(&self, amount: Decimal, code: &str) -> Decimal {
        let rate = self.rate(code);
        if rate.is_zero() {
            return Decimal::ZERO;
        }
        amount.checked_div(rate).unwrap_or(Decimal::MAX)
    }

    /// Converts a base-unit amount and renders it with the currency symbol.
    pub fn format(&self, amount: Decimal, code: &str, options: FormatOptions) -> String {
        let currency = self.get(code);
        format!("{}{}", currency.symbol, format_amount(amount.saturating_mul(currency.rate), options))
    }

    pub fn label(&self, code: &str) -> String {
        self.get(code).label()
    }

    /// Builds a new table with non-base rates taken from `rates`.
    ///
    /// The base stays pinned to 1 and codes absent from `rates` keep their
    /// current rate.
    pub fn merge_rates(&self, rates: &HashMap<String, Decimal>) -> RateMerge {
        let mut updated = Vec::new();
        let mut missing = Vec::new();
        let others = self
            .others
            .iter()
            .map(|currency| match rates.get(&currency.code) {
                Some(rate) if *rate > Decimal::ZERO => {
                    updated.push(currency.code.clone());
                    Currency { rate: *rate, ..currency.clone() }
                }
                _ => {
                    missing.push(currency.code.clone());
                    currency.clone()
                }
            })
            .collect();

        RateMerge {
            table: Self { base: Currency { rate: Decimal::ONE, ..self.base.clone() }, others },
            updated,
            missing,
        }
    }
}
