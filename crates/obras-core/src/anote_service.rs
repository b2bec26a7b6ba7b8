//! Expense entry (anote) operations scoped to their owning project.

use rust_decimal::Decimal;
use tracing::info;

use obras_domain::{amount_in_range, non_blank, Anote, AnoteInput, Displayable, RowId, MAX_AMOUNT};

use crate::{Clock, CoreError, ObraService, ObraStore};

/// Provides create/read/update/delete helpers for [`Anote`] rows.
///
/// Every operation is addressed through the owning project; an entry that
/// belongs to a different project is reported as not found.
pub struct AnoteService;

impl AnoteService {
    /// Entries of an existing project, newest first.
    pub fn list_for_obra<S: ObraStore + ?Sized>(
        store: &S,
        obra_id: RowId,
    ) -> Result<Vec<Anote>, CoreError> {
        ObraService::get(store, obra_id)?;
        store.list_anotes(obra_id)
    }

    pub fn get<S: ObraStore + ?Sized>(
        store: &S,
        obra_id: RowId,
        anote_id: RowId,
    ) -> Result<Anote, CoreError> {
        store
            .get_anote(anote_id)?
            .filter(|anote| anote.obra_id == obra_id)
            .ok_or(CoreError::AnoteNotFound(anote_id))
    }

    /// Records a new entry stamped with the clock's current time.
    pub fn create<S, C>(
        store: &S,
        clock: &C,
        obra_id: RowId,
        input: AnoteInput,
    ) -> Result<Anote, CoreError>
    where
        S: ObraStore + ?Sized,
        C: Clock + ?Sized,
    {
        ObraService::get(store, obra_id)?;
        let input = validate(input)?;
        let anote = store.insert_anote(obra_id, input, clock.now())?;
        info!(obra_id, anote_id = anote.id, amount = %anote.amount, "anote created");
        Ok(anote)
    }

    /// Edits reason and amount. The timestamp is immutable.
    pub fn update<S: ObraStore + ?Sized>(
        store: &S,
        obra_id: RowId,
        anote_id: RowId,
        input: AnoteInput,
    ) -> Result<Anote, CoreError> {
        Self::get(store, obra_id, anote_id)?;
        let input = validate(input)?;
        let anote = store
            .update_anote(anote_id, input)?
            .ok_or(CoreError::AnoteNotFound(anote_id))?;
        info!(obra_id, anote_id, "anote updated");
        Ok(anote)
    }

    pub fn delete<S: ObraStore + ?Sized>(
        store: &S,
        obra_id: RowId,
        anote_id: RowId,
    ) -> Result<(), CoreError> {
        let anote = Self::get(store, obra_id, anote_id)?;
        if !store.delete_anote(anote_id)? {
            return Err(CoreError::AnoteNotFound(anote_id));
        }
        info!(obra_id, anote = %anote.display_label(), "anote deleted");
        Ok(())
    }
}

fn validate(input: AnoteInput) -> Result<AnoteInput, CoreError> {
    let reason = non_blank(&input.reason)
        .ok_or_else(|| CoreError::Validation("anote reason is required".into()))?
        .to_string();
    if input.amount < Decimal::ZERO {
        return Err(CoreError::Validation(
            "anote amount must not be negative".into(),
        ));
    }
    if !amount_in_range(input.amount) {
        return Err(CoreError::Validation(format!(
            "anote amount must be below {MAX_AMOUNT}"
        )));
    }
    Ok(AnoteInput {
        reason,
        amount: input.amount,
    })
}
