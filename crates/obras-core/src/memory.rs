//! Process-local [`ObraStore`] backed by a mutex-guarded [`Snapshot`].

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use obras_domain::{Anote, AnoteInput, Obra, ObraInput, RowId};

use crate::{storage::Snapshot, CoreError, ObraStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current table state.
    pub fn snapshot(&self) -> Result<Snapshot, CoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>, CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }
}

impl ObraStore for MemoryStore {
    fn list_obras(&self) -> Result<Vec<Obra>, CoreError> {
        Ok(self.lock()?.list_obras())
    }

    fn get_obra(&self, id: RowId) -> Result<Option<Obra>, CoreError> {
        Ok(self.lock()?.get_obra(id))
    }

    fn insert_obra(&self, input: ObraInput) -> Result<Obra, CoreError> {
        Ok(self.lock()?.insert_obra(input))
    }

    fn update_obra(&self, id: RowId, input: ObraInput) -> Result<Option<Obra>, CoreError> {
        Ok(self.lock()?.update_obra(id, input))
    }

    fn delete_obra(&self, id: RowId) -> Result<bool, CoreError> {
        Ok(self.lock()?.delete_obra(id))
    }

    fn list_anotes(&self, obra_id: RowId) -> Result<Vec<Anote>, CoreError> {
        Ok(self.lock()?.list_anotes(obra_id))
    }

    fn get_anote(&self, id: RowId) -> Result<Option<Anote>, CoreError> {
        Ok(self.lock()?.get_anote(id))
    }

    fn insert_anote(
        &self,
        obra_id: RowId,
        input: AnoteInput,
        timestamp: DateTime<Utc>,
    ) -> Result<Anote, CoreError> {
        Ok(self.lock()?.insert_anote(obra_id, input, timestamp))
    }

    fn update_anote(&self, id: RowId, input: AnoteInput) -> Result<Option<Anote>, CoreError> {
        Ok(self.lock()?.update_anote(id, input))
    }

    fn delete_anote(&self, id: RowId) -> Result<bool, CoreError> {
        Ok(self.lock()?.delete_anote(id))
    }

    fn delete_anotes_for_obra(&self, obra_id: RowId) -> Result<usize, CoreError> {
        Ok(self.lock()?.delete_anotes_for_obra(obra_id))
    }
}
