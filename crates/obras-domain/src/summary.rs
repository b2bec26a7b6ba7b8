//! Derived views over a project's expense entries.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{anote::Anote, obra::Obra};

/// Expense entries that fall into one Monday-to-Sunday calendar week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekGroup {
    pub label: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// Entries of the week, most recent first.
    pub anotes: Vec<Anote>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl WeekGroup {
    /// Renders the heading shown above a week, e.g. `WEEK OF 05/08 TO 11/08`.
    pub fn label_for(week_start: NaiveDate, week_end: NaiveDate) -> String {
        format!(
            "WEEK OF {:02}/{:02} TO {:02}/{:02}",
            week_start.day(),
            week_start.month(),
            week_end.day(),
            week_end.month()
        )
    }

    pub fn len(&self) -> usize {
        self.anotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anotes.is_empty()
    }
}

/// Budget, spent and remaining amounts for one project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub budget: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining: Decimal,
}

impl BudgetTotals {
    pub fn from_parts(budget: Decimal, spent: Decimal) -> Self {
        Self {
            budget,
            spent,
            remaining: budget.saturating_sub(spent),
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining.is_sign_negative() && !self.remaining.is_zero()
    }
}

/// Everything the summary views render for one project, recomputed per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectSummary {
    pub obra: Obra,
    pub totals: BudgetTotals,
    pub current_week: Vec<Anote>,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_week_total: Decimal,
    pub weeks: Vec<WeekGroup>,
}
