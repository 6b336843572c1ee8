use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::reference::DocumentRef;
use crate::errors::DomainError;

/// Manager link of an employee.
///
/// Incoming data carries the manager's raw id; once persisted the link is a
/// reference into the employee collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManagerRef {
    Reference(DocumentRef),
    Id(String),
}

impl ManagerRef {
    pub fn id(&self) -> &str {
        match self {
            ManagerRef::Reference(reference) => &reference.id,
            ManagerRef::Id(id) => id,
        }
    }

    /// Turns a raw id into a reference into `collection`; references pass through.
    pub fn resolve(self, collection: &str) -> DocumentRef {
        match self {
            ManagerRef::Reference(reference) => reference,
            ManagerRef::Id(id) => DocumentRef::new(collection, id),
        }
    }
}

/// Core Employee entity - represents the business domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>, // None until the store assigns one
    pub name: String,
    pub email: String,
    pub team: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<ManagerRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn new(name: String, email: String, team: String, company: String) -> Self {
        Self {
            id: None,
            name,
            email,
            team,
            company,
            manager: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_manager(mut self, manager_id: impl Into<String>) -> Self {
        self.manager = Some(ManagerRef::Id(manager_id.into()));
        self
    }
}

/// Loosely-typed employee body as submitted by clients.
///
/// Values are kept as raw JSON so the validator sees exactly what was sent;
/// `null` counts as absent. Creation requires the four identity fields while
/// updates apply only the fields that are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<Value>,
}

impl EmployeeDraft {
    /// Fields a new record must carry, plus `manager` when supplied.
    pub fn creation_fields(&self) -> Vec<(&'static str, Option<&Value>)> {
        let mut fields = vec![
            ("name", self.name.as_ref()),
            ("email", self.email.as_ref()),
            ("team", self.team.as_ref()),
            ("company", self.company.as_ref()),
        ];
        if let Some(manager) = self.manager.as_ref() {
            fields.push(("manager", Some(manager)));
        }
        fields
    }

    /// Only the fields present in the body.
    pub fn present_fields(&self) -> Vec<(&'static str, Option<&Value>)> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("team", &self.team),
            ("company", &self.company),
            ("manager", &self.manager),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key, Some(v))))
        .collect()
    }

    /// Applies write-time normalisation (lower-cased email).
    pub fn normalized(mut self) -> Self {
        if let Some(Value::String(email)) = self.email.as_mut() {
            *email = email.to_lowercase();
        }
        self
    }

    /// String view of the body; non-string values are dropped.
    pub fn into_changes(self) -> EmployeeChanges {
        let text = |value: Option<Value>| match value {
            Some(Value::String(text)) => Some(text),
            _ => None,
        };

        EmployeeChanges {
            name: text(self.name),
            email: text(self.email),
            team: text(self.team),
            company: text(self.company),
            manager: text(self.manager),
        }
    }

    pub fn into_employee(self) -> Result<Employee, DomainError> {
        self.into_changes().into_employee()
    }
}

/// Validated, string-typed field changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub team: Option<String>,
    pub company: Option<String>,
    pub manager: Option<String>,
}

impl EmployeeChanges {
    pub fn into_employee(self) -> Result<Employee, DomainError> {
        let missing = |field: &str| DomainError::ValidationError(format!("Field '{}' is required", field));

        let employee = Employee::new(
            self.name.ok_or_else(|| missing("name"))?,
            self.email.ok_or_else(|| missing("email"))?,
            self.team.ok_or_else(|| missing("team"))?,
            self.company.ok_or_else(|| missing("company"))?,
        );

        Ok(match self.manager {
            Some(manager) => employee.with_manager(manager),
            None => employee,
        })
    }
}
