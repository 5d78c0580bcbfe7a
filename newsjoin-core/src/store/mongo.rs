//! MongoDB document store (synchronous driver).

use super::{DocumentStore, StoreError};
use crate::config::CollectionRef;
use bson::Document;
use mongodb::sync::{Client, Collection};
use tracing::debug;

pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Parse `uri` and build a client. The driver connects lazily, so an
    /// unreachable server surfaces on the first read or write.
    pub fn connect(uri: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)?;
        Ok(Self { client })
    }

    fn collection(&self, target: &CollectionRef) -> Collection<Document> {
        self.client
            .database(&target.database)
            .collection::<Document>(&target.collection)
    }
}

impl DocumentStore for MongoStore {
    fn fetch_all(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection(collection).find(None, None)?;
        let docs = cursor.collect::<Result<Vec<_>, _>>()?;
        debug!(%collection, count = docs.len(), "fetched documents");
        Ok(docs)
    }

    fn insert_many(
        &self,
        collection: &CollectionRef,
        docs: Vec<Document>,
    ) -> Result<usize, StoreError> {
        if docs.is_empty() {
            return Err(StoreError::EmptyBatch(collection.to_string()));
        }
        let result = self.collection(collection).insert_many(docs, None)?;
        debug!(%collection, count = result.inserted_ids.len(), "inserted documents");
        Ok(result.inserted_ids.len())
    }
}
