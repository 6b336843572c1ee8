use async_trait::async_trait;
use diesel::prelude::*;
use domain::DocumentRef;

use super::{auto_id, CollectionRef, Document, DocumentStore, Query, Snapshot, StoreError};
use crate::database::{documents, SqlitePool};

// Database model
#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct DocumentModel {
    collection: String,
    id: String,
    body: String,
}

impl DocumentModel {
    fn encode(collection: &str, id: &str, fields: &Document) -> Result<Self, StoreError> {
        let body = serde_json::to_string(fields).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self {
            collection: collection.to_string(),
            id: id.to_string(),
            body,
        })
    }

    fn decode(self) -> Result<Snapshot, StoreError> {
        let fields: Document = serde_json::from_str(&self.body)
            .map_err(|e| StoreError::MalformedDocument(format!("{}/{}", self.collection, self.id), e.to_string()))?;
        Ok(Snapshot { id: self.id, fields })
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

/// Document store persisted in a single SQLite table.
///
/// Diesel is synchronous, so every call runs on the blocking thread pool.
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn run<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();

        // Checkout can block until a connection frees up, so it happens off the runtime too.
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            work(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create(&self, collection: &CollectionRef, fields: Document) -> Result<Snapshot, StoreError> {
        let model = DocumentModel::encode(collection.name(), &auto_id(), &fields)?;

        self.run(move |conn| {
            diesel::insert_into(documents::table)
                .values(&model)
                .execute(conn)?;
            Ok(Snapshot { id: model.id, fields })
        })
        .await
    }

    async fn get(&self, reference: &DocumentRef) -> Result<Option<Snapshot>, StoreError> {
        let DocumentRef { collection, id } = reference.clone();

        let model = self
            .run(move |conn| {
                Ok(documents::table
                    .filter(documents::collection.eq(collection))
                    .filter(documents::id.eq(id))
                    .select(DocumentModel::as_select())
                    .first::<DocumentModel>(conn)
                    .optional()?)
            })
            .await?;

        model.map(DocumentModel::decode).transpose()
    }

    async fn update(&self, reference: &DocumentRef, fields: Document) -> Result<Option<Snapshot>, StoreError> {
        let DocumentRef { collection, id } = reference.clone();

        self.run(move |conn| {
            // Take the write lock up front; a deferred read-then-write cannot upgrade under contention.
            conn.immediate_transaction::<_, StoreError, _>(|conn| {
                let stored = documents::table
                    .filter(documents::collection.eq(collection.as_str()))
                    .filter(documents::id.eq(id.as_str()))
                    .select(DocumentModel::as_select())
                    .first::<DocumentModel>(conn)
                    .optional()?;

                let Some(stored) = stored else {
                    return Ok(None);
                };

                let mut snapshot = stored.decode()?;
                snapshot.fields.extend(fields);
                let merged = DocumentModel::encode(&collection, &id, &snapshot.fields)?;

                diesel::update(
                    documents::table
                        .filter(documents::collection.eq(collection.as_str()))
                        .filter(documents::id.eq(id.as_str())),
                )
                .set(documents::body.eq(merged.body))
                .execute(conn)?;

                Ok(Some(snapshot))
            })
        })
        .await
    }

    async fn delete(&self, reference: &DocumentRef) -> Result<(), StoreError> {
        let DocumentRef { collection, id } = reference.clone();

        self.run(move |conn| {
            diesel::delete(
                documents::table
                    .filter(documents::collection.eq(collection))
                    .filter(documents::id.eq(id)),
            )
            .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn find(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let collection = query.collection.clone();

        let models = self
            .run(move |conn| {
                Ok(documents::table
                    .filter(documents::collection.eq(collection))
                    .order(documents::id.asc())
                    .select(DocumentModel::as_select())
                    .load::<DocumentModel>(conn)?)
            })
            .await?;

        // Field predicates are evaluated on the decoded documents.
        let mut matching = Vec::new();
        for model in models {
            let snapshot = model.decode()?;
            if query.matches(&snapshot.fields) {
                matching.push(snapshot);
            }
        }
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::store::FieldValue;
    use chrono::Utc;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, SqliteDocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.db");
        let database = Database::open(path.to_str().unwrap()).unwrap();
        (dir, SqliteDocumentStore::new(database.get_pool().clone()))
    }

    fn employee_document() -> Document {
        let mut fields = Document::new();
        fields.insert("name".to_string(), FieldValue::from("Ann"));
        fields.insert("team".to_string(), FieldValue::from("Eng"));
        fields.insert(
            "manager".to_string(),
            FieldValue::from(DocumentRef::new("employees", "mgr1")),
        );
        fields.insert("createdAt".to_string(), FieldValue::from(Utc::now()));
        fields
    }

    #[tokio::test]
    async fn test_create_then_get_preserves_typed_fields() {
        let (_dir, store) = open_store();
        let employees = CollectionRef::new("employees");

        let created = store.create(&employees, employee_document()).await.unwrap();
        let fetched = store.get(&employees.doc(&created.id)).await.unwrap();

        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_update_merges_and_reports_missing() {
        let (_dir, store) = open_store();
        let employees = CollectionRef::new("employees");
        let created = store.create(&employees, employee_document()).await.unwrap();

        let mut changes = Document::new();
        changes.insert("team".to_string(), FieldValue::from("Ops"));
        let updated = store
            .update(&employees.doc(&created.id), changes.clone())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.fields.get("team"), Some(&FieldValue::from("Ops")));
        assert_eq!(updated.fields.get("name"), Some(&FieldValue::from("Ann")));
        assert_eq!(
            store.get(&employees.doc(&created.id)).await.unwrap(),
            Some(updated)
        );
        assert_eq!(store.update(&employees.doc("nope"), changes).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_creates_and_updates_all_succeed() {
        let (_dir, store) = open_store();
        let store = std::sync::Arc::new(store);
        let employees = CollectionRef::new("employees");
        let seeded = store.create(&employees, employee_document()).await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..64 {
            let store = store.clone();
            let employees = employees.clone();
            let seeded_id = seeded.id.clone();
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    store.create(&employees, employee_document()).await.map(|_| ())
                } else {
                    let mut changes = Document::new();
                    changes.insert("team".to_string(), FieldValue::from(format!("Team {}", i)));
                    store
                        .update(&employees.doc(seeded_id), changes)
                        .await
                        .map(|updated| assert!(updated.is_some()))
                }
            }));
        }

        let mut failures = Vec::new();
        for task in tasks {
            if let Err(e) = task.await.unwrap() {
                failures.push(e.to_string());
            }
        }

        assert!(failures.is_empty(), "failed store calls: {:?}", failures);
        assert_eq!(store.find(&employees.query()).await.unwrap().len(), 33);
    }

    #[tokio::test]
    async fn test_find_by_reference_and_delete() {
        let (_dir, store) = open_store();
        let employees = CollectionRef::new("employees");
        let report = store.create(&employees, employee_document()).await.unwrap();
        store.create(&employees, Document::new()).await.unwrap();

        let query = employees
            .query()
            .where_eq("manager", employees.doc("mgr1"));
        let found = store.find(&query).await.unwrap();
        assert_eq!(found, vec![report.clone()]);

        store.delete(&employees.doc(&report.id)).await.unwrap();
        store.delete(&employees.doc(&report.id)).await.unwrap();
        assert!(store.find(&query).await.unwrap().is_empty());
        assert_eq!(store.find(&employees.query()).await.unwrap().len(), 1);
    }
}
