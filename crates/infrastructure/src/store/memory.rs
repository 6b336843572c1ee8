use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use domain::DocumentRef;
use tokio::sync::RwLock;

use super::{auto_id, CollectionRef, Document, DocumentStore, Query, Snapshot, StoreError};

/// Process-local document store.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, collection: &CollectionRef, fields: Document) -> Result<Snapshot, StoreError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.name().to_string()).or_default();

        let mut id = auto_id();
        while documents.contains_key(&id) {
            id = auto_id();
        }

        documents.insert(id.clone(), fields.clone());
        Ok(Snapshot { id, fields })
    }

    async fn get(&self, reference: &DocumentRef) -> Result<Option<Snapshot>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&reference.collection)
            .and_then(|documents| documents.get(&reference.id))
            .map(|fields| Snapshot {
                id: reference.id.clone(),
                fields: fields.clone(),
            }))
    }

    async fn update(&self, reference: &DocumentRef, fields: Document) -> Result<Option<Snapshot>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(stored) = collections
            .get_mut(&reference.collection)
            .and_then(|documents| documents.get_mut(&reference.id))
        else {
            return Ok(None);
        };

        stored.extend(fields);
        Ok(Some(Snapshot {
            id: reference.id.clone(),
            fields: stored.clone(),
        }))
    }

    async fn delete(&self, reference: &DocumentRef) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(documents) = collections.get_mut(&reference.collection) {
            documents.remove(&reference.id);
        }
        Ok(())
    }

    async fn find(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&query.collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|(_, fields)| query.matches(fields))
                    .map(|(id, fields)| Snapshot {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
