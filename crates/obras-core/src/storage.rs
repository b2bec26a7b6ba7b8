use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use obras_domain::{Anote, AnoteInput, Identifiable, Obra, ObraInput, RowId};

use crate::{aggregation::newest_first, CoreError};

/// Version 2 stores amounts as decimal strings; version 1 files held floats
/// and still load.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Persistence gateway for projects and their expense entries.
///
/// Stores own id assignment: ids are handed out in increasing order and never
/// reused. Stores never cascade; removing a project's entries before the
/// project is the caller's job (see [`ObraService::delete`](crate::ObraService::delete)).
pub trait ObraStore: Send + Sync {
    /// All projects ordered by id.
    fn list_obras(&self) -> Result<Vec<Obra>, CoreError>;
    fn get_obra(&self, id: RowId) -> Result<Option<Obra>, CoreError>;
    fn insert_obra(&self, input: ObraInput) -> Result<Obra, CoreError>;
    fn update_obra(&self, id: RowId, input: ObraInput) -> Result<Option<Obra>, CoreError>;
    fn delete_obra(&self, id: RowId) -> Result<bool, CoreError>;

    /// Entries of one project, newest first.
    fn list_anotes(&self, obra_id: RowId) -> Result<Vec<Anote>, CoreError>;
    fn get_anote(&self, id: RowId) -> Result<Option<Anote>, CoreError>;
    fn insert_anote(
        &self,
        obra_id: RowId,
        input: AnoteInput,
        timestamp: DateTime<Utc>,
    ) -> Result<Anote, CoreError>;
    fn update_anote(&self, id: RowId, input: AnoteInput) -> Result<Option<Anote>, CoreError>;
    fn delete_anote(&self, id: RowId) -> Result<bool, CoreError>;
    /// Removes every entry of `obra_id` and returns how many were removed.
    fn delete_anotes_for_obra(&self, obra_id: RowId) -> Result<usize, CoreError>;
}

/// Complete table state shared by the in-memory and file-backed stores.
///
/// Rows keep their wire field names on disk, but amounts are written as
/// exact decimal strings rather than the floats the HTTP layer emits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default = "Snapshot::default_schema_version")]
    pub schema_version: u32,
    pub next_obra_id: RowId,
    pub next_anote_id: RowId,
    #[serde(default, with = "stored::obras")]
    pub obras: Vec<Obra>,
    #[serde(default, with = "stored::anotes")]
    pub anotes: Vec<Anote>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            next_obra_id: 1,
            next_anote_id: 1,
            obras: Vec::new(),
            anotes: Vec::new(),
        }
    }
}

impl Snapshot {
    pub fn default_schema_version() -> u32 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn list_obras(&self) -> Vec<Obra> {
        let mut obras = self.obras.clone();
        obras.sort_by_key(|obra| obra.id);
        obras
    }

    pub fn get_obra(&self, id: RowId) -> Option<Obra> {
        self.obras.iter().find(|obra| obra.id == id).cloned()
    }

    pub fn insert_obra(&mut self, input: ObraInput) -> Obra {
        let obra = Obra::new(self.next_obra_id, input.name, input.budget);
        self.next_obra_id += 1;
        self.obras.push(obra.clone());
        obra
    }

    pub fn update_obra(&mut self, id: RowId, input: ObraInput) -> Option<Obra> {
        let obra = self.obras.iter_mut().find(|obra| obra.id == id)?;
        obra.apply(input);
        Some(obra.clone())
    }

    pub fn delete_obra(&mut self, id: RowId) -> bool {
        let before = self.obras.len();
        self.obras.retain(|obra| obra.id != id);
        self.obras.len() != before
    }

    pub fn list_anotes(&self, obra_id: RowId) -> Vec<Anote> {
        let mut anotes: Vec<Anote> = self
            .anotes
            .iter()
            .filter(|anote| anote.obra_id == obra_id)
            .cloned()
            .collect();
        anotes.sort_by(newest_first);
        anotes
    }

    pub fn get_anote(&self, id: RowId) -> Option<Anote> {
        self.anotes.iter().find(|anote| anote.id == id).cloned()
    }

    pub fn insert_anote(
        &mut self,
        obra_id: RowId,
        input: AnoteInput,
        timestamp: DateTime<Utc>,
    ) -> Anote {
        let anote = Anote::new(
            self.next_anote_id,
            obra_id,
            input.reason,
            input.amount,
            timestamp,
        );
        self.next_anote_id += 1;
        self.anotes.push(anote.clone());
        anote
    }

    pub fn update_anote(&mut self, id: RowId, input: AnoteInput) -> Option<Anote> {
        let anote = self.anotes.iter_mut().find(|anote| anote.id == id)?;
        anote.apply(input);
        Some(anote.clone())
    }

    pub fn delete_anote(&mut self, id: RowId) -> bool {
        let before = self.anotes.len();
        self.anotes.retain(|anote| anote.id != id);
        self.anotes.len() != before
    }

    pub fn delete_anotes_for_obra(&mut self, obra_id: RowId) -> usize {
        let before = self.anotes.len();
        self.anotes.retain(|anote| anote.obra_id != obra_id);
        before - self.anotes.len()
    }

    /// Moves the id counters past any id already present so new rows never collide.
    pub fn repair_counters(&mut self) {
        self.next_obra_id = self.next_obra_id.max(max_id(&self.obras) + 1);
        self.next_anote_id = self.next_anote_id.max(max_id(&self.anotes) + 1);
    }
}

/// On-disk row layouts. `Decimal`'s own serde impl writes strings and reads
/// both strings and numbers, so older float files still load.
mod stored {
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};

    use obras_domain::{Anote, Obra, RowId};

    #[derive(Serialize, Deserialize)]
    struct StoredObra {
        #[serde(rename = "id_Obra")]
        id: RowId,
        #[serde(rename = "nombre")]
        name: String,
        #[serde(rename = "costo")]
        budget: Decimal,
    }

    #[derive(Serialize, Deserialize)]
    struct StoredAnote {
        #[serde(rename = "id_Anotes")]
        id: RowId,
        #[serde(rename = "razon")]
        reason: String,
        #[serde(rename = "gasto")]
        amount: Decimal,
        #[serde(rename = "fecha")]
        timestamp: DateTime<Utc>,
        #[serde(rename = "id_Obra")]
        obra_id: RowId,
    }

    pub mod obras {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::*;

        pub fn serialize<S: Serializer>(rows: &[Obra], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(rows.iter().map(|obra| StoredObra {
                id: obra.id,
                name: obra.name.clone(),
                budget: obra.budget,
            }))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Obra>, D::Error> {
            let rows = Vec::<StoredObra>::deserialize(deserializer)?;
            Ok(rows
                .into_iter()
                .map(|row| Obra::new(row.id, row.name, row.budget))
                .collect())
        }
    }

    pub mod anotes {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::*;

        pub fn serialize<S: Serializer>(rows: &[Anote], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(rows.iter().map(|anote| StoredAnote {
                id: anote.id,
                reason: anote.reason.clone(),
                amount: anote.amount,
                timestamp: anote.timestamp,
                obra_id: anote.obra_id,
            }))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Anote>, D::Error> {
            let rows = Vec::<StoredAnote>::deserialize(deserializer)?;
            Ok(rows
                .into_iter()
                .map(|row| Anote::new(row.id, row.obra_id, row.reason, row.amount, row.timestamp))
                .collect())
        }
    }
}

fn max_id<T: Identifiable>(rows: &[T]) -> RowId {
    rows.iter().map(Identifiable::id).max().unwrap_or(0)
}

/// Detects orphaned entries, duplicate ids and stale id counters in a snapshot.
pub fn integrity_warnings(snapshot: &Snapshot) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut obra_ids = HashSet::new();
    for obra in &snapshot.obras {
        if !obra_ids.insert(obra.id) {
            warnings.push(format!("obra id {} appears more than once", obra.id));
        }
        if obra.id >= snapshot.next_obra_id {
            warnings.push(format!(
                "obra {} is not below next_obra_id {}",
                obra.id, snapshot.next_obra_id
            ));
        }
    }

    let mut anote_ids = HashSet::new();
    for anote in &snapshot.anotes {
        if !anote_ids.insert(anote.id) {
            warnings.push(format!("anote id {} appears more than once", anote.id));
        }
        if !obra_ids.contains(&anote.obra_id) {
            warnings.push(format!(
                "anote {} references missing obra {}",
                anote.id, anote.obra_id
            ));
        }
        if anote.id >= snapshot.next_anote_id {
            warnings.push(format!(
                "anote {} is not below next_anote_id {}",
                anote.id, snapshot.next_anote_id
            ));
        }
    }
    warnings
}
