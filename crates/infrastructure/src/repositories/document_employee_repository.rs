use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::{DomainError, Employee, EmployeeChanges, EmployeeFilters, EmployeeRepository, ManagerRef};
use tracing::debug;

use crate::store::{build_query, CollectionRef, Document, DocumentStore, FieldValue, Snapshot, StoreError};

const NAME: &str = "name";
const EMAIL: &str = "email";
const TEAM: &str = "team";
const COMPANY: &str = "company";
const MANAGER: &str = "manager";
const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

/// Employee persistence on top of any [`DocumentStore`].
pub struct DocumentEmployeeRepository {
    store: Arc<dyn DocumentStore>,
    collection: CollectionRef,
}

impl DocumentEmployeeRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: CollectionRef::new(collection),
        }
    }

    fn to_document(&self, employee: Employee) -> Document {
        let mut fields = Document::new();
        fields.insert(NAME.to_string(), FieldValue::String(employee.name));
        fields.insert(EMAIL.to_string(), FieldValue::String(employee.email));
        fields.insert(TEAM.to_string(), FieldValue::String(employee.team));
        fields.insert(COMPANY.to_string(), FieldValue::String(employee.company));
        if let Some(manager) = employee.manager {
            fields.insert(
                MANAGER.to_string(),
                FieldValue::Reference(manager.resolve(self.collection.name())),
            );
        }
        if let Some(created_at) = employee.created_at {
            fields.insert(CREATED_AT.to_string(), FieldValue::Timestamp(created_at));
        }
        if let Some(updated_at) = employee.updated_at {
            fields.insert(UPDATED_AT.to_string(), FieldValue::Timestamp(updated_at));
        }
        fields
    }

    fn changes_document(&self, changes: EmployeeChanges) -> Document {
        let mut fields = Document::new();
        for (key, value) in [
            (NAME, changes.name),
            (EMAIL, changes.email),
            (TEAM, changes.team),
            (COMPANY, changes.company),
        ] {
            if let Some(value) = value {
                fields.insert(key.to_string(), FieldValue::String(value));
            }
        }
        if let Some(manager) = changes.manager {
            fields.insert(MANAGER.to_string(), FieldValue::Reference(self.collection.doc(manager)));
        }
        fields.insert(UPDATED_AT.to_string(), FieldValue::Timestamp(Utc::now()));
        fields
    }

    fn from_snapshot(&self, snapshot: Snapshot) -> Result<Employee, StoreError> {
        let Snapshot { id, mut fields } = snapshot;
        let malformed = |reason: String| {
            StoreError::MalformedDocument(self.collection.doc(id.as_str()).to_string(), reason)
        };

        let mut text = |key: &str| match fields.remove(key) {
            Some(FieldValue::String(value)) => Ok(value),
            Some(other) => Err(malformed(format!("field '{}' is not a string: {:?}", key, other))),
            None => Err(malformed(format!("field '{}' is missing", key))),
        };

        let mut employee = Employee::new(text(NAME)?, text(EMAIL)?, text(TEAM)?, text(COMPANY)?);

        employee.manager = match fields.remove(MANAGER) {
            Some(FieldValue::Reference(reference)) => Some(ManagerRef::Reference(reference)),
            Some(FieldValue::String(manager_id)) => Some(ManagerRef::Id(manager_id)),
            Some(FieldValue::Timestamp(_)) => {
                return Err(malformed("field 'manager' is a timestamp".to_string()));
            }
            None => None,
        };

        employee.created_at = match fields.remove(CREATED_AT) {
            Some(FieldValue::Timestamp(at)) => Some(at),
            _ => None,
        };
        employee.updated_at = match fields.remove(UPDATED_AT) {
            Some(FieldValue::Timestamp(at)) => Some(at),
            _ => None,
        };
        employee.id = Some(id);

        Ok(employee)
    }
}

#[async_trait]
impl EmployeeRepository for DocumentEmployeeRepository {
    async fn exists(&self, id: Option<&str>, email: Option<&str>) -> Result<bool, DomainError> {
        match (id, email) {
            (Some(id), _) => Ok(self.store.get(&self.collection.doc(id)).await?.is_some()),
            (None, Some(email)) => {
                let query = self.collection.query().where_eq(EMAIL, email);
                Ok(!self.store.find(&query).await?.is_empty())
            }
            (None, None) => Ok(false),
        }
    }

    async fn create(&self, mut employee: Employee) -> Result<Employee, DomainError> {
        let now = Utc::now();
        employee.id = None;
        employee.created_at = Some(now);
        employee.updated_at = Some(now);

        let snapshot = self
            .store
            .create(&self.collection, self.to_document(employee))
            .await?;
        debug!("Stored employee document {}", snapshot.id);

        Ok(self.from_snapshot(snapshot)?)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Employee>, DomainError> {
        match self.store.get(&self.collection.doc(id)).await? {
            Some(snapshot) => Ok(Some(self.from_snapshot(snapshot)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self, filters: Option<&EmployeeFilters>) -> Result<Vec<Employee>, DomainError> {
        let query = match filters {
            Some(filters) => build_query(&self.collection, filters),
            None => self.collection.query(),
        };

        let snapshots = self.store.find(&query).await?;
        let employees = snapshots
            .into_iter()
            .map(|snapshot| self.from_snapshot(snapshot))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(employees)
    }

    async fn update(&self, id: &str, changes: EmployeeChanges) -> Result<Option<Employee>, DomainError> {
        let updated = self
            .store
            .update(&self.collection.doc(id), self.changes_document(changes))
            .await?;

        match updated {
            Some(snapshot) => Ok(Some(self.from_snapshot(snapshot)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.store.delete(&self.collection.doc(id)).await?;
        Ok(())
    }
}
