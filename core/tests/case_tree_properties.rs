//! Property tests over randomly shaped case trees.

use payroll_client::{CaseSetup, CaseValueSetup};
use proptest::prelude::*;

fn arb_value() -> impl Strategy<Value = CaseValueSetup> {
    ("[A-D]", proptest::option::of("[12]?"), "[0-9]{1,3}").prop_map(|(field, slot, value)| CaseValueSetup {
        case_slot: slot,
        ..CaseValueSetup::new(&field, &value)
    })
}

fn arb_tree() -> impl Strategy<Value = CaseSetup> {
    let leaf = ("[A-C]", prop::collection::vec(arb_value(), 0..4))
        .prop_map(|(name, values)| CaseSetup::new(&name).with_values(values));
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            "[A-C]",
            prop::collection::vec(arb_value(), 0..4),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(name, values, related_cases)| {
                related_cases
                    .into_iter()
                    .fold(CaseSetup::new(&name).with_values(values), CaseSetup::with_related)
            })
    })
}

fn node_count(tree: &CaseSetup) -> usize {
    1 + tree.related_cases.iter().map(node_count).sum::<usize>()
}

fn value_count(tree: &CaseSetup) -> usize {
    tree.values.len() + tree.related_cases.iter().map(value_count).sum::<usize>()
}

/// Rename every value to a unique field so no key repeats.
fn make_unique(tree: &mut CaseSetup, next: &mut usize) {
    for value in &mut tree.values {
        value.case_field_name = format!("F{next}");
        *next += 1;
    }
    for related in &mut tree.related_cases {
        make_unique(related, next);
    }
}

proptest! {
    #[test]
    fn collect_visits_every_node_and_value(tree in arb_tree()) {
        let setups = tree.collect_case_setups();
        prop_assert_eq!(setups.len(), node_count(&tree));
        prop_assert!(std::ptr::eq(setups[0], &tree));
        prop_assert_eq!(tree.collect_case_values().len(), value_count(&tree));
    }

    #[test]
    fn every_collected_value_is_findable_in_its_slot(tree in arb_tree()) {
        for setup in tree.collect_case_setups() {
            for value in &setup.values {
                let found = tree.find_case_value(&value.case_field_name, setup.case_slot.as_deref());
                prop_assert!(found.is_some());
            }
        }
    }

    #[test]
    fn unique_keys_have_no_duplicate(mut tree in arb_tree()) {
        make_unique(&mut tree, &mut 0);
        prop_assert!(tree.find_duplicated_case_value().is_none());
    }

    #[test]
    fn repeated_value_is_reported(mut tree in arb_tree(), value in arb_value()) {
        make_unique(&mut tree, &mut 0);
        tree.values.insert(0, value.clone());
        tree.related_cases.push(CaseSetup::new("Repeat").with_value(value.clone()));

        let duplicate = tree.find_duplicated_case_value();
        prop_assert_eq!(duplicate, Some(&value));
        let last = tree.collect_case_values().into_iter().last();
        prop_assert!(std::ptr::eq(duplicate.unwrap(), last.unwrap()));
    }

    #[test]
    fn walks_leave_the_tree_unchanged(tree in arb_tree()) {
        let before = tree.clone();
        let _ = tree.find_duplicated_case_value();
        let _ = tree.collect_case_values();
        let _ = tree.find_case_setup("A", None);
        prop_assert_eq!(tree, before);
    }
}
