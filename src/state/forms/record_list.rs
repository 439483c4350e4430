//! Repeatable records for list-cardinality steps

use super::field::{FieldValue, Record};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Key under which records carry their identity token
pub const ID_FIELD: &str = "id";

/// Produces a fresh default record for a step
pub type DraftFactory = Arc<dyn Fn() -> Record + Send + Sync>;

/// Stable identity of a list item, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Read the identity a record echoes back under [`ID_FIELD`]
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        value
            .as_text()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Self)
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Result of appending an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddedItem {
    pub id: ItemId,
    pub len: usize,
}

/// Why a list mutation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    UnknownItem(ItemId),
    MinimumCardinality,
}

/// A sub-record with its identity, as exposed to renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordListItem {
    pub id: ItemId,
    pub record: Record,
}

/// Ordered collection of drafts keyed by [`ItemId`]. Never empty.
#[derive(Clone)]
pub struct RecordList {
    items: IndexMap<ItemId, Record>,
    factory: DraftFactory,
}

impl fmt::Debug for RecordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordList")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl RecordList {
    /// Create a list holding one fresh draft
    pub fn new(factory: DraftFactory) -> Self {
        let mut list = Self {
            items: IndexMap::new(),
            factory,
        };
        list.add();
        list
    }

    /// Append a fresh draft. There is no upper bound.
    pub fn add(&mut self) -> AddedItem {
        let id = ItemId::new();
        self.items.insert(id, (self.factory)());
        AddedItem {
            id,
            len: self.items.len(),
        }
    }

    /// Remove an item, keeping the order of the others. Refuses to remove the
    /// last remaining item.
    pub fn remove(&mut self, id: ItemId) -> Result<Record, ListError> {
        if !self.items.contains_key(&id) {
            return Err(ListError::UnknownItem(id));
        }
        if self.items.len() <= 1 {
            return Err(ListError::MinimumCardinality);
        }
        self.items
            .shift_remove(&id)
            .ok_or(ListError::UnknownItem(id))
    }

    /// Merge a partial update into one item. An identity in the patch is ignored.
    pub fn update(&mut self, id: ItemId, mut patch: Record) -> Result<(), ListError> {
        let item = self.items.get_mut(&id).ok_or(ListError::UnknownItem(id))?;
        patch.remove(ID_FIELD);
        item.extend(patch);
        Ok(())
    }

    /// Replace all drafts with `records`, in their given order. A record that
    /// echoes the identity of a current item keeps it; every other record,
    /// including a repeated identity, gets a fresh one. Items absent from
    /// `records` are dropped and their identities retired. An empty input is
    /// refused.
    pub fn replace_all(&mut self, records: Vec<Record>) -> Result<(), ListError> {
        if records.is_empty() {
            return Err(ListError::MinimumCardinality);
        }
        let mut items: IndexMap<ItemId, Record> = IndexMap::with_capacity(records.len());
        for mut record in records {
            let echoed = record
                .remove(ID_FIELD)
                .as_ref()
                .and_then(ItemId::from_value)
                .filter(|id| self.items.contains_key(id) && !items.contains_key(id));
            items.insert(echoed.unwrap_or_else(ItemId::new), record);
        }
        self.items = items;
        Ok(())
    }

    pub fn get(&self, id: ItemId) -> Option<&Record> {
        self.items.get(&id)
    }

    pub fn id_at(&self, index: usize) -> Option<ItemId> {
        self.items.get_index(index).map(|(id, _)| *id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.keys().copied()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.items.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Record)> {
        self.items.iter().map(|(id, r)| (*id, r))
    }

    /// Snapshot of the list for rendering
    pub fn snapshot(&self) -> Vec<RecordListItem> {
        self.iter()
            .map(|(id, record)| RecordListItem {
                id,
                record: record.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
