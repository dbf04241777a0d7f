use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub show_decimals: bool,
}

impl FormatOptions {
    pub fn whole() -> Self {
        Self { show_decimals: false }
    }

    pub fn decimals() -> Self {
        Self { show_decimals: true }
    }

    fn fraction_digits(self) -> u32 {
        if self.show_decimals {
            2
        } else {
            0
        }
    }
}

/// en-US grouping with a fixed number of fraction digits, e.g. `12,345.60`.
pub fn format_amount(amount: Decimal, options: FormatOptions) -> String {
    let digits = options.fraction_digits();
    let mut rounded = amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(digits);

    let rendered = rounded.abs().to_string();
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let mut output = String::with_capacity(rendered.len() + rendered.len() / 3 + 1);
    if rounded.is_sign_negative() {
        output.push('-');
    }
    output.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        output.push('.');
        output.push_str(fraction);
    }
    output
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
