//! Shared traits and helpers for project and expense primitives.

use rust_decimal::Decimal;

/// Identifier type assigned by the persistence gateway.
pub type RowId = i64;

/// Upper bound (exclusive) for a single budget or expense: one quadrillion.
///
/// Keeps every sum a project can reach far from the `Decimal` overflow point.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Checks that `amount` is neither negative nor at or above [`MAX_AMOUNT`].
pub fn amount_in_range(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount < MAX_AMOUNT
}

/// Exposes the gateway-assigned identifier of a stored row.
pub trait Identifiable {
    fn id(&self) -> RowId;
}

/// Supplies a common contract for retrieving monetary amounts.
pub trait Amounted {
    fn amount(&self) -> Decimal;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Trims `value` and returns it when something is left.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
