use config::{Config, StoreBackend};
use domain::*;
use infrastructure::*;
use std::sync::Arc;
use tracing::info;

/// Employee Application - wires the store, repository and service together
pub struct EmployeeApp {
    pub employee_service: EmployeeService,
}

impl EmployeeApp {
    pub fn new(store: Arc<dyn DocumentStore>, collection: &str) -> Self {
        // Adapter over the document store
        let employee_repository: Arc<dyn EmployeeRepository> =
            Arc::new(DocumentEmployeeRepository::new(store, collection));

        // Domain services
        let employee_service = EmployeeService::new(employee_repository);

        Self { employee_service }
    }

    /// Application backed by a fresh in-memory store.
    pub fn in_memory(collection: &str) -> Self {
        Self::new(Arc::new(MemoryDocumentStore::new()), collection)
    }

    pub fn from_config(config: &Config) -> Result<Self, DomainError> {
        let store: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory document store");
                Arc::new(MemoryDocumentStore::new())
            }
            StoreBackend::Sqlite => {
                let database = Database::open(&config.database_path)?;
                Arc::new(SqliteDocumentStore::new(database.get_pool().clone()))
            }
        };

        Ok(Self::new(store, &config.employee_collection))
    }
}
