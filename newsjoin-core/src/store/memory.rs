//! In-memory stores for job tests and dry runs.

use super::{DocumentStore, StoreError, TableSink};
use crate::config::CollectionRef;
use crate::domain::RefinedRow;
use bson::{oid::ObjectId, Document};
use std::collections::HashMap;
use std::sync::Mutex;

/// Collections held in a map. Inserted documents get an `_id` like the real
/// store assigns.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<CollectionRef, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `collection` with `docs`, replacing whatever it held.
    pub fn with_collection(self, collection: CollectionRef, docs: Vec<Document>) -> Self {
        if let Ok(mut map) = self.collections.lock() {
            map.insert(collection, docs);
        }
        self
    }

    pub fn len(&self, collection: &CollectionRef) -> usize {
        self.collections
            .lock()
            .map(|map| map.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Other("memory store lock poisoned".into())
}

impl DocumentStore for MemoryDocumentStore {
    fn fetch_all(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError> {
        let map = self.collections.lock().map_err(poisoned)?;
        Ok(map.get(collection).cloned().unwrap_or_default())
    }

    fn insert_many(
        &self,
        collection: &CollectionRef,
        docs: Vec<Document>,
    ) -> Result<usize, StoreError> {
        if docs.is_empty() {
            return Err(StoreError::EmptyBatch(collection.to_string()));
        }
        let mut map = self.collections.lock().map_err(poisoned)?;
        let stored = map.entry(collection.clone()).or_default();
        let count = docs.len();
        for mut doc in docs {
            if !doc.contains_key("_id") {
                doc.insert("_id", ObjectId::new());
            }
            stored.push(doc);
        }
        Ok(count)
    }
}

/// Tables held in a map, with a count of replace calls.
#[derive(Debug, Default)]
pub struct MemoryTableSink {
    tables: HashMap<String, Vec<RefinedRow>>,
    replacements: usize,
}

impl MemoryTableSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&[RefinedRow]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl TableSink for MemoryTableSink {
    fn replace_table(&mut self, table: &str, rows: &[RefinedRow]) -> Result<usize, StoreError> {
        self.tables.insert(table.to_string(), rows.to_vec());
        self.replacements += 1;
        Ok(rows.len())
    }
}
