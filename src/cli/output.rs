use colored::Colorize;
use rust_decimal::Decimal;

use obras_core::format::{format_amount, format_date, AmountStyle};
use obras_domain::{Anote, BudgetTotals};

const SEPARATOR_WIDTH: usize = 48;

pub fn section(title: impl AsRef<str>) {
    println!("{}", format!("=== {} ===", title.as_ref().trim()).bold());
}

pub fn separator() {
    println!("{}", "-".repeat(SEPARATOR_WIDTH).dimmed());
}

pub fn success(message: impl AsRef<str>) {
    println!("{} {}", "[ok]".green().bold(), message.as_ref());
}

pub fn info(message: impl AsRef<str>) {
    println!("{}", message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
    eprintln!("{} {}", "[!]".yellow().bold(), message.as_ref());
}

/// Prints `label: value` rows with the labels padded to a common width.
pub fn two_column(rows: &[(&str, String)]) {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        println!("  {:<width$}  {}", format!("{label}:"), value, width = width + 1);
    }
}

/// Remaining budget in green, or red once spending passed the budget.
pub fn remaining_cell(totals: &BudgetTotals, style: &AmountStyle, width: usize) -> String {
    let text = format!("{:>width$}", format_amount(totals.remaining, style));
    if totals.is_over_budget() {
        text.red().bold().to_string()
    } else {
        text.green().to_string()
    }
}

pub fn amount_cell(value: Decimal, style: &AmountStyle, width: usize) -> String {
    format!("{:>width$}", format_amount(value, style))
}

/// One entry line: local date, reason and amount.
pub fn anote_line<Tz: chrono::TimeZone>(anote: &Anote, tz: &Tz, style: &AmountStyle) -> String {
    format!(
        "  {}  {:<28}  {}",
        format_date(anote.local_date(tz)),
        truncate(&anote.reason, 28),
        amount_cell(anote.amount, style, 16)
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max.saturating_sub(1)).collect();
    shortened.push('~');
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_reasons_are_shortened() {
        assert_eq!(truncate("cemento", 28), "cemento");
        assert_eq!(truncate("abcdefghij", 5), "abcd~");
    }

    #[test]
    fn remaining_cell_keeps_alignment() {
        colored::control::set_override(false);
        let totals = BudgetTotals::from_parts(Decimal::new(1000, 0), Decimal::new(1200, 0));
        let cell = remaining_cell(&totals, &AmountStyle::default(), 14);
        assert_eq!(cell, "    Bs -200,00");
    }
}
