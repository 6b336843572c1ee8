use crate::entities::{EmployeeDraft, OperationResult};
use crate::errors::DomainError;
use crate::repositories::{EmployeeFilters, EmployeeRepository};
use crate::validation;
use std::sync::Arc;
use tracing::{debug, info};

/// Employee Service - Contains business logic
///
/// Every operation returns an [`OperationResult`]; expected failures never
/// surface as `Err`. The check-then-act sequences are not atomic, so two
/// concurrent creates with the same email can both pass the uniqueness check.
pub struct EmployeeService {
    employee_repository: Arc<dyn EmployeeRepository>,
}

impl EmployeeService {
    pub fn new(employee_repository: Arc<dyn EmployeeRepository>) -> Self {
        Self { employee_repository }
    }

    /// Create a new employee.
    ///
    /// Order matters: validation, email uniqueness, manager existence, then the
    /// write, so malformed input never reaches the store.
    pub async fn create_employee(&self, body: EmployeeDraft) -> Result<OperationResult, DomainError> {
        let validation = validation::validate(body.creation_fields());
        if !validation.success {
            return Ok(validation);
        }

        let employee = body.normalized().into_employee()?;

        if self
            .employee_repository
            .exists(None, Some(employee.email.as_str()))
            .await?
        {
            return Ok(OperationResult::failure(format!(
                "Employee with email {} already exists.",
                employee.email
            )));
        }

        if let Some(manager) = &employee.manager {
            if !self
                .employee_repository
                .exists(Some(manager.id()), None)
                .await?
            {
                return Ok(OperationResult::failure(format!(
                    "Manager with id {} does not exist.",
                    manager.id()
                )));
            }
        }

        let name = employee.name.clone();
        let created = self.employee_repository.create(employee).await?;
        info!("Created employee {:?} ({})", created.id, name);

        Ok(OperationResult::success(format!(
            "Employee record of {} is created successfully.",
            name
        ))
        .with_employee(created))
    }

    /// Get employee by ID
    pub async fn get_employee_by_id(&self, id: &str) -> Result<OperationResult, DomainError> {
        if !self.employee_repository.exists(Some(id), None).await? {
            return Ok(not_found(id));
        }

        // The record can vanish between the check and the read.
        match self.employee_repository.get_by_id(id).await? {
            Some(employee) => {
                debug!("Fetched employee {}", id);
                Ok(OperationResult::ok().with_employee(employee))
            }
            None => Ok(not_found(id)),
        }
    }

    /// Get all employees, narrowed by equality filters when any are given
    pub async fn get_all_employees(
        &self,
        filters: Option<&EmployeeFilters>,
    ) -> Result<OperationResult, DomainError> {
        let filters = filters.filter(|f| !f.is_empty());
        let employees = self.employee_repository.get_all(filters).await?;
        debug!("Listed {} employees", employees.len());

        Ok(OperationResult::ok().with_employees(employees))
    }

    /// Apply a partial update.
    pub async fn update_employee(
        &self,
        id: &str,
        body: EmployeeDraft,
    ) -> Result<OperationResult, DomainError> {
        if !self.employee_repository.exists(Some(id), None).await? {
            return Ok(not_found(id));
        }

        let validation = validation::validate(body.present_fields());
        if !validation.success {
            return Ok(validation);
        }

        let changes = body.normalized().into_changes();

        // Check if new email conflicts with another employee
        if let Some(email) = changes.email.as_deref() {
            let filters = EmployeeFilters::from([("email".to_string(), email.to_string())]);
            let holders = self.employee_repository.get_all(Some(&filters)).await?;
            if holders.iter().any(|holder| holder.id.as_deref() != Some(id)) {
                return Ok(OperationResult::failure(format!(
                    "Employee with email {} already exists.",
                    email
                )));
            }
        }

        match self.employee_repository.update(id, changes).await? {
            Some(updated) => {
                info!("Updated employee {}", id);
                Ok(OperationResult::success(format!(
                    "Employee record of {} is updated successfully.",
                    id
                ))
                .with_employee(updated))
            }
            None => Ok(not_found(id)),
        }
    }

    /// Delete employee
    pub async fn delete_employee(&self, id: &str) -> Result<OperationResult, DomainError> {
        if !self.employee_repository.exists(Some(id), None).await? {
            return Ok(not_found(id));
        }

        self.employee_repository.delete(id).await?;
        info!("Deleted employee {}", id);

        Ok(OperationResult::success(format!(
            "Employee record of {} is deleted successfully.",
            id
        )))
    }
}

fn not_found(id: &str) -> OperationResult {
    OperationResult::failure(format!("Employee with id {} not found.", id))
}
