//! Construction project ("obra") records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::*;

/// A construction project with its total budget.
///
/// Field names on the wire follow the original backend (`id_Obra`,
/// `nombre`, `costo`) so existing frontends keep working.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Obra {
    #[serde(rename = "id_Obra")]
    pub id: RowId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "costo", with = "rust_decimal::serde::float")]
    pub budget: Decimal,
}

impl Obra {
    pub fn new(id: RowId, name: impl Into<String>, budget: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            budget,
        }
    }

    /// Replaces the mutable fields with the values in `input`.
    pub fn apply(&mut self, input: ObraInput) {
        self.name = input.name;
        self.budget = input.budget;
    }
}

impl Identifiable for Obra {
    fn id(&self) -> RowId {
        self.id
    }
}

impl Displayable for Obra {
    fn display_label(&self) -> String {
        format!("obra:{} [{}]", self.id, self.name)
    }
}

/// Payload used to create a project or replace its name and budget.
///
/// Amounts are accepted either as JSON numbers or numeric strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObraInput {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "costo")]
    pub budget: Decimal,
}

impl ObraInput {
    pub fn new(name: impl Into<String>, budget: Decimal) -> Self {
        Self {
            name: name.into(),
            budget,
        }
    }
}
