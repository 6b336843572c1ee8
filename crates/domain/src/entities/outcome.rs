use serde::{Deserialize, Serialize};

use super::employee::Employee;

/// Data carried by a successful read or write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmployeePayload {
    One(Employee),
    Many(Vec<Employee>),
}

/// Uniform outcome of every employee service operation.
///
/// Expected business failures (invalid body, duplicate email, unknown id) are
/// reported here with `success == false`; only store faults become errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<EmployeePayload>,
}

impl OperationResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            response: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            response: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            response: None,
        }
    }

    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.response = Some(EmployeePayload::One(employee));
        self
    }

    pub fn with_employees(mut self, employees: Vec<Employee>) -> Self {
        self.response = Some(EmployeePayload::Many(employees));
        self
    }

    pub fn employee(&self) -> Option<&Employee> {
        match &self.response {
            Some(EmployeePayload::One(employee)) => Some(employee),
            _ => None,
        }
    }

    pub fn employees(&self) -> Option<&[Employee]> {
        match &self.response {
            Some(EmployeePayload::Many(employees)) => Some(employees),
            _ => None,
        }
    }
}
