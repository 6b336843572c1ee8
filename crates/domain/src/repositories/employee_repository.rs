use std::collections::BTreeMap;

use crate::entities::{Employee, EmployeeChanges};
use crate::errors::DomainError;
use async_trait::async_trait;

/// Flat `field -> value` equality filters taken from a query string.
pub type EmployeeFilters = BTreeMap<String, String>;

/// Repository trait - defines what we need from persistence layer
/// This is a PORT in hexagonal architecture
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Looks up by `id` when given, otherwise by `email`; false when neither is given.
    async fn exists(&self, id: Option<&str>, email: Option<&str>) -> Result<bool, DomainError>;
    async fn create(&self, employee: Employee) -> Result<Employee, DomainError>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Employee>, DomainError>;
    async fn get_all(&self, filters: Option<&EmployeeFilters>) -> Result<Vec<Employee>, DomainError>;
    /// Merges the present fields of `changes`; returns the stored record after the merge.
    async fn update(&self, id: &str, changes: EmployeeChanges) -> Result<Option<Employee>, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}
