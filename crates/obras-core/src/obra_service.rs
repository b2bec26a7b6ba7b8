//! Project (obra) lifecycle: validation, lookup and the cascading delete.

use rust_decimal::Decimal;
use tracing::info;

use obras_domain::{amount_in_range, non_blank, Displayable, Obra, ObraInput, RowId, MAX_AMOUNT};

use crate::{CoreError, ObraStore};

/// Provides create/read/update/delete helpers for [`Obra`] rows.
pub struct ObraService;

impl ObraService {
    /// Lists every project ordered by id.
    pub fn list<S: ObraStore + ?Sized>(store: &S) -> Result<Vec<Obra>, CoreError> {
        store.list_obras()
    }

    pub fn get<S: ObraStore + ?Sized>(store: &S, id: RowId) -> Result<Obra, CoreError> {
        store.get_obra(id)?.ok_or(CoreError::ObraNotFound(id))
    }

    /// Validates and stores a new project.
    pub fn create<S: ObraStore + ?Sized>(store: &S, input: ObraInput) -> Result<Obra, CoreError> {
        let input = validate(input)?;
        let obra = store.insert_obra(input)?;
        info!(obra_id = obra.id, name = %obra.name, "obra created");
        Ok(obra)
    }

    /// Replaces name and budget of an existing project.
    pub fn update<S: ObraStore + ?Sized>(
        store: &S,
        id: RowId,
        input: ObraInput,
    ) -> Result<Obra, CoreError> {
        let input = validate(input)?;
        let obra = store
            .update_obra(id, input)?
            .ok_or(CoreError::ObraNotFound(id))?;
        info!(obra_id = id, "obra updated");
        Ok(obra)
    }

    /// Deletes the project's entries first and then the project itself.
    ///
    /// Returns how many entries were removed along with the project.
    pub fn delete<S: ObraStore + ?Sized>(store: &S, id: RowId) -> Result<usize, CoreError> {
        let obra = Self::get(store, id)?;
        let removed = store.delete_anotes_for_obra(id)?;
        if !store.delete_obra(id)? {
            return Err(CoreError::ObraNotFound(id));
        }
        info!(obra = %obra.display_label(), anotes_removed = removed, "obra deleted");
        Ok(removed)
    }
}

fn validate(input: ObraInput) -> Result<ObraInput, CoreError> {
    let name = non_blank(&input.name)
        .ok_or_else(|| CoreError::Validation("obra name is required".into()))?
        .to_string();
    if input.budget < Decimal::ZERO {
        return Err(CoreError::Validation(
            "obra budget must not be negative".into(),
        ));
    }
    if !amount_in_range(input.budget) {
        return Err(CoreError::Validation(format!(
            "obra budget must be below {MAX_AMOUNT}"
        )));
    }
    Ok(ObraInput {
        name,
        budget: input.budget,
    })
}
