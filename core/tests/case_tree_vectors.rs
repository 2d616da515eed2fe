//! Check the case tree algorithms against JSON vectors in `test-vectors/`.
//!
//! Each vector holds a case tree, the expected pre-order of its field names,
//! value lookups by `(field, slot)` and the expected duplicate, if any.

use payroll_client::case_tree::{self, CaseSetup};
use serde_json::Value;

fn slot(lookup: &Value) -> Option<&str> {
    lookup["slot"].as_str()
}

#[test]
fn case_tree_vectors() {
    let raw = include_str!("../test-vectors/case_tree.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let tree: CaseSetup = serde_json::from_value(case["tree"].clone()).unwrap();

        let order: Vec<&str> = tree
            .collect_case_values()
            .iter()
            .map(|value| value.case_field_name.as_str())
            .collect();
        let expected_order: Vec<&str> = case["order"]
            .as_array()
            .unwrap()
            .iter()
            .map(|field| field.as_str().unwrap())
            .collect();
        assert_eq!(order, expected_order, "{name}: order");

        for lookup in case["lookups"].as_array().unwrap() {
            let field = lookup["field"].as_str().unwrap();
            let found = tree.find_case_value(field, slot(lookup));
            assert_eq!(
                found.and_then(|value| value.value.as_deref()),
                lookup["value"].as_str(),
                "{name}: lookup {field} {:?}",
                slot(lookup)
            );
        }

        let duplicate = tree.find_duplicated_case_value();
        match case["duplicate"].as_object() {
            None => assert!(duplicate.is_none(), "{name}: unexpected duplicate {duplicate:?}"),
            Some(expected) => {
                let duplicate = duplicate.unwrap_or_else(|| panic!("{name}: duplicate not found"));
                assert_eq!(duplicate.case_field_name, expected["field"].as_str().unwrap(), "{name}");
                assert_eq!(duplicate.case_slot.as_deref(), expected["slot"].as_str(), "{name}");
                assert_eq!(duplicate.value.as_deref(), expected["value"].as_str(), "{name}");
            }
        }
    }
}

#[test]
fn absent_tree_yields_nothing() {
    assert!(case_tree::find_case_value(None, "Salary", None).is_none());
    assert!(case_tree::find_case_setup(None, "Wage", None).is_none());
    assert!(case_tree::find_duplicated_case_value(None).is_none());
    assert!(case_tree::collect_case_setups(None).is_empty());
    assert!(case_tree::collect_case_values(None).is_empty());
}
