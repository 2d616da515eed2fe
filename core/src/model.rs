//! Resource envelope and the entity DTOs exchanged with the backend.
//!
//! Every entity carries the same envelope: a server-assigned `id` (0 until
//! created), a status, server-stamped timestamps, and a client-side
//! `update_mode` that decides whether an upsert against an existing record
//! touches the network. `update_mode` never goes over the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::QueryEnum;

/// Lifecycle status of a backend record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectStatus {
    #[default]
    Active,
    Inactive,
}

impl QueryEnum for ObjectStatus {
    fn query_name(&self) -> &'static str {
        match self {
            ObjectStatus::Active => "Active",
            ObjectStatus::Inactive => "Inactive",
        }
    }
}

/// Whether an upsert may overwrite an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    #[default]
    Update,
    NoUpdate,
}

/// The envelope shared by all transmittable entities.
pub trait Resource {
    fn id(&self) -> i32;
    fn set_id(&mut self, id: i32);
    fn status(&self) -> ObjectStatus;
    fn created(&self) -> Option<DateTime<Utc>>;
    fn set_created(&mut self, created: DateTime<Utc>);
    fn updated(&self) -> Option<DateTime<Utc>>;
    fn update_mode(&self) -> UpdateMode;

    /// True once the server has assigned an id.
    fn is_stored(&self) -> bool {
        self.id() > 0
    }
}

macro_rules! impl_resource {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl Resource for $entity {
                fn id(&self) -> i32 {
                    self.id
                }

                fn set_id(&mut self, id: i32) {
                    self.id = id;
                }

                fn status(&self) -> ObjectStatus {
                    self.status
                }

                fn created(&self) -> Option<DateTime<Utc>> {
                    self.created
                }

                fn set_created(&mut self, created: DateTime<Utc>) {
                    self.created = Some(created);
                }

                fn updated(&self) -> Option<DateTime<Utc>> {
                    self.updated
                }

                fn update_mode(&self) -> UpdateMode {
                    self.update_mode
                }
            }
        )+
    };
}

/// Top-level customer scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
}

impl Tenant {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
}

impl Division {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    pub identifier: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    pub identifier: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Names of the divisions the employee belongs to.
    #[serde(default)]
    pub divisions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regulation {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    pub name: String,
    #[serde(default)]
    pub version: i32,
    #[serde(default)]
    pub shared_regulation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Scope a case applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaseType {
    Global,
    National,
    Company,
    #[default]
    Employee,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    pub name: String,
    #[serde(default)]
    pub case_type: CaseType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payroll {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    pub name: String,
    #[serde(default)]
    pub division_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payrun {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    pub name: String,
    #[serde(default)]
    pub payroll_id: i32,
}

/// Regulation layer of a payroll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollLayer {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    pub level: i32,
    #[serde(default = "default_priority")]
    pub priority: i32,
    pub regulation_name: String,
}

fn default_priority() -> i32 {
    1
}

/// Named input of a payrun.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrunParameter {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub mandatory: bool,
}

/// One stored case value of a case change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseValue {
    pub case_name: String,
    pub case_field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

/// A case change as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseChange {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub update_mode: UpdateMode,
    #[serde(default)]
    pub user_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub values: Vec<CaseValue>,
}

impl_resource!(
    Tenant,
    Division,
    User,
    Employee,
    Regulation,
    Case,
    Payroll,
    Payrun,
    PayrollLayer,
    PayrunParameter,
    CaseChange,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tenant_is_not_stored() {
        let tenant = Tenant::new("Acme");
        assert_eq!(tenant.id(), 0);
        assert!(!tenant.is_stored());
        assert_eq!(tenant.update_mode(), UpdateMode::Update);
    }

    #[test]
    fn update_mode_is_never_serialized() {
        let mut tenant = Tenant::new("Acme");
        tenant.update_mode = UpdateMode::NoUpdate;
        let json = serde_json::to_value(&tenant).unwrap();
        assert!(json.get("updateMode").is_none());
        assert_eq!(json["identifier"], "Acme");
        assert_eq!(json["status"], "Active");
        assert!(json.get("created").is_none());
    }

    #[test]
    fn envelope_fields_deserialize_from_backend_json() {
        let division: Division = serde_json::from_str(
            r#"{"id":12,"status":"Inactive","created":"2024-01-02T03:04:05Z","name":"Sales"}"#,
        )
        .unwrap();
        assert_eq!(division.id(), 12);
        assert_eq!(division.status(), ObjectStatus::Inactive);
        assert!(division.created().is_some());
        assert!(division.updated().is_none());
        assert_eq!(division.name, "Sales");
    }

    #[test]
    fn set_created_stamps_once() {
        let mut payroll = Payroll::default();
        let now = Utc::now();
        payroll.set_created(now);
        assert_eq!(payroll.created(), Some(now));
    }
}
