//! Case change payloads and the read-only algorithms over their case tree.
//!
//! # Design
//! A `CaseSetup` owns its values and its related sub-cases, so a tree is
//! acyclic by construction. All walks are pre-order (node before its related
//! cases, related cases in list order) and run on an explicit stack, so deep
//! trees cannot exhaust the call stack.
//!
//! Case names, field names and slots compare by exact string equality. A
//! missing slot and an empty slot are different keys.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One field value inside a case setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseValueSetup {
    pub case_field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_slot: Option<String>,
    /// Value as JSON text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl CaseValueSetup {
    pub fn new(case_field_name: &str, value: &str) -> Self {
        Self {
            case_field_name: case_field_name.to_string(),
            value: Some(value.to_string()),
            ..Self::default()
        }
    }

    pub fn with_slot(mut self, case_slot: &str) -> Self {
        self.case_slot = Some(case_slot.to_string());
        self
    }

    /// The `(field name, slot)` identity of this value.
    pub fn key(&self) -> (&str, Option<&str>) {
        (&self.case_field_name, self.case_slot.as_deref())
    }
}

/// A node of the case tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSetup {
    pub case_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_slot: Option<String>,
    #[serde(default)]
    pub values: Vec<CaseValueSetup>,
    #[serde(default)]
    pub related_cases: Vec<CaseSetup>,
}

impl CaseSetup {
    pub fn new(case_name: &str) -> Self {
        Self {
            case_name: case_name.to_string(),
            case_slot: None,
            values: Vec::new(),
            related_cases: Vec::new(),
        }
    }

    pub fn with_slot(mut self, case_slot: &str) -> Self {
        self.case_slot = Some(case_slot.to_string());
        self
    }

    pub fn with_values(mut self, values: Vec<CaseValueSetup>) -> Self {
        self.values.extend(values);
        self
    }

    pub fn with_value(mut self, value: CaseValueSetup) -> Self {
        self.values.push(value);
        self
    }

    pub fn with_related(mut self, related: CaseSetup) -> Self {
        self.related_cases.push(related);
        self
    }

    /// Pre-order walk over this node and all related cases.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn find_case_setup(&self, case_name: &str, case_slot: Option<&str>) -> Option<&CaseSetup> {
        self.iter()
            .find(|setup| setup.case_name == case_name && setup.case_slot.as_deref() == case_slot)
    }

    /// First value named `case_field_name` in a node whose own slot is `case_slot`.
    pub fn find_case_value(&self, case_field_name: &str, case_slot: Option<&str>) -> Option<&CaseValueSetup> {
        self.iter()
            .filter(|setup| setup.case_slot.as_deref() == case_slot)
            .find_map(|setup| {
                setup
                    .values
                    .iter()
                    .find(|value| value.case_field_name == case_field_name)
            })
    }

    /// The first value whose `(field name, slot)` key was already seen
    /// earlier in pre-order.
    pub fn find_duplicated_case_value(&self) -> Option<&CaseValueSetup> {
        let mut seen = HashSet::new();
        self.iter()
            .flat_map(|setup| setup.values.iter())
            .find(|&value| !seen.insert(value.key()))
    }

    pub fn collect_case_setups(&self) -> Vec<&CaseSetup> {
        self.iter().collect()
    }

    pub fn collect_case_values(&self) -> Vec<&CaseValueSetup> {
        self.iter().flat_map(|setup| setup.values.iter()).collect()
    }
}

/// Related cases are detached onto a work list so dropping a deep tree
/// does not recurse.
impl Drop for CaseSetup {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.related_cases);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.related_cases);
        }
    }
}

/// Pre-order iterator over a case tree.
#[derive(Debug, Clone)]
pub struct PreOrder<'a> {
    stack: Vec<&'a CaseSetup>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a CaseSetup;

    fn next(&mut self) -> Option<Self::Item> {
        let setup = self.stack.pop()?;
        self.stack.extend(setup.related_cases.iter().rev());
        Some(setup)
    }
}

impl<'a> IntoIterator for &'a CaseSetup {
    type Item = &'a CaseSetup;
    type IntoIter = PreOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub fn find_case_setup<'a>(
    tree: Option<&'a CaseSetup>,
    case_name: &str,
    case_slot: Option<&str>,
) -> Option<&'a CaseSetup> {
    tree?.find_case_setup(case_name, case_slot)
}

pub fn find_case_value<'a>(
    tree: Option<&'a CaseSetup>,
    case_field_name: &str,
    case_slot: Option<&str>,
) -> Option<&'a CaseValueSetup> {
    tree?.find_case_value(case_field_name, case_slot)
}

pub fn find_duplicated_case_value(tree: Option<&CaseSetup>) -> Option<&CaseValueSetup> {
    tree?.find_duplicated_case_value()
}

pub fn collect_case_setups(tree: Option<&CaseSetup>) -> Vec<&CaseSetup> {
    tree.map(CaseSetup::collect_case_setups).unwrap_or_default()
}

pub fn collect_case_values(tree: Option<&CaseSetup>) -> Vec<&CaseValueSetup> {
    tree.map(CaseSetup::collect_case_values).unwrap_or_default()
}

/// A case change submitted to the backend: one case tree plus its context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseChangeSetup {
    pub user_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_date: Option<DateTime<Utc>>,
    pub case: CaseSetup,
}

impl CaseChangeSetup {
    pub fn new(user_id: i32, case: CaseSetup) -> Self {
        Self {
            user_id,
            case,
            ..Self::default()
        }
    }

    pub fn find_case_value(&self, case_field_name: &str, case_slot: Option<&str>) -> Option<&CaseValueSetup> {
        self.case.find_case_value(case_field_name, case_slot)
    }

    pub fn find_duplicated_case_value(&self) -> Option<&CaseValueSetup> {
        self.case.find_duplicated_case_value()
    }

    pub fn collect_case_values(&self) -> Vec<&CaseValueSetup> {
        self.case.collect_case_values()
    }
}
