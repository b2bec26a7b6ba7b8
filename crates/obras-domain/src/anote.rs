//! Expense entries ("anotes") logged against a project.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::*;

/// A single dated expense recorded against an [`Obra`](crate::Obra).
///
/// `timestamp` is assigned when the entry is created and never changes;
/// only `reason` and `amount` can be edited afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Anote {
    #[serde(rename = "id_Anotes")]
    pub id: RowId,
    #[serde(rename = "razon")]
    pub reason: String,
    #[serde(rename = "gasto", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "fecha")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "id_Obra")]
    pub obra_id: RowId,
}

impl Anote {
    pub fn new(
        id: RowId,
        obra_id: RowId,
        reason: impl Into<String>,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            reason: reason.into(),
            amount,
            timestamp,
            obra_id,
        }
    }

    /// Replaces the editable fields. The timestamp is left untouched.
    pub fn apply(&mut self, input: AnoteInput) {
        self.reason = input.reason;
        self.amount = input.amount;
    }

    /// Calendar date of the entry as seen from `tz`.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.timestamp.with_timezone(tz).date_naive()
    }
}

impl Identifiable for Anote {
    fn id(&self) -> RowId {
        self.id
    }
}

impl Amounted for Anote {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Displayable for Anote {
    fn display_label(&self) -> String {
        format!("anote:{} [{}]", self.id, self.reason)
    }
}

/// Payload used to create an entry or edit its reason and amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnoteInput {
    #[serde(rename = "razon")]
    pub reason: String,
    #[serde(rename = "gasto")]
    pub amount: Decimal,
}

impl AnoteInput {
    pub fn new(reason: impl Into<String>, amount: Decimal) -> Self {
        Self {
            reason: reason.into(),
            amount,
        }
    }
}
