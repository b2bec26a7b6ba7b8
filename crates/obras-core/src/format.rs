//! Locale-style rendering of amounts and dates for presentation layers.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency symbol, separators and precision used when rendering amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountStyle {
    pub symbol: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub precision: u32,
}

impl Default for AmountStyle {
    fn default() -> Self {
        Self {
            symbol: "Bs".into(),
            decimal_separator: ',',
            grouping_separator: '.',
            precision: 2,
        }
    }
}

/// Formats the absolute value of `value` with grouping, e.g. `1.234,50`.
pub fn format_number(value: Decimal, style: &AmountStyle) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(style.precision, RoundingStrategy::MidpointAwayFromZero);
    let body = format!("{:.*}", style.precision as usize, rounded);
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body.as_str(), None),
    };
    let grouped = group_digits(int_part, style.grouping_separator);
    match frac_part {
        Some(frac) => format!("{}{}{}", grouped, style.decimal_separator, frac),
        None => grouped,
    }
}

/// Formats `value` with the currency symbol, e.g. `Bs 1.234,50` or `Bs -200,00`.
pub fn format_amount(value: Decimal, style: &AmountStyle) -> String {
    let body = format_number(value, style);
    let rounded =
        value.round_dp_with_strategy(style.precision, RoundingStrategy::MidpointAwayFromZero);
    if rounded < Decimal::ZERO {
        format!("{} -{}", style.symbol, body)
    } else {
        format!("{} {}", style.symbol, body)
    }
}

/// Renders a date as `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}
