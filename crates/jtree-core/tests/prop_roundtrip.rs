/// Property-based tests for the tree, its JSON text form and its compact form.
///
/// Strategies generate trees whose containers are never empty, since empty
/// containers are not stored in the compact form. Object keys include the
/// characters that need escaping in paths (`/`, `[`, `%`). Number leaves
/// include doubles across the whole normal range and exponent spellings.
use std::collections::HashSet;

use jtree_core::{deserialize, serialize, Number, PathFilter, Value};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// A non-empty object key, deliberately including path syntax characters.
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::string::string_regex("[a-z][a-z0-9_]{0,6}").unwrap(),
        1 => prop::string::string_regex("[a-z/%\\[\\] .-]{1,6}").unwrap(),
        1 => Just("[0]".to_string()),
        1 => Just("%2F".to_string()),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e6..1.0e6f64).prop_map(Value::from),
        prop::num::f64::NORMAL.prop_map(Value::from),
        prop::string::string_regex("-?[1-9][0-9]{0,3}(\\.[0-9]{1,3})?[eE][+-]?[0-9]{1,3}")
            .unwrap()
            .prop_map(|text| Value::Number(Number::parse(text))),
        "\\PC{0,12}".prop_map(Value::from),
    ]
}

fn arb_tree_inner(depth: u32) -> BoxedStrategy<Value> {
    if depth == 0 {
        return arb_leaf().boxed();
    }
    prop_oneof![
        2 => arb_leaf(),
        2 => prop::collection::vec((arb_key(), arb_tree_inner(depth - 1)), 1..5).prop_map(
            |pairs| {
                let mut seen = HashSet::new();
                Value::Object(
                    pairs
                        .into_iter()
                        .filter(|(key, _)| seen.insert(key.clone()))
                        .collect(),
                )
            }
        ),
        2 => prop::collection::vec(arb_tree_inner(depth - 1), 1..5).prop_map(Value::Array),
    ]
    .boxed()
}

/// A tree of up to four levels whose root is a container.
fn arb_tree() -> impl Strategy<Value = Value> {
    arb_tree_inner(4).prop_filter("root must be a container", |v| !v.is_scalar())
}

// ============================================================================
// Helpers
// ============================================================================

/// Scalar leaves as `(path, value)` pairs in path order.
fn scalar_leaves(root: &Value) -> Vec<(String, Value)> {
    let mut leaves: Vec<(String, Value)> = root
        .to_paths(0, PathFilter::Leaves)
        .into_iter()
        .filter_map(|path| {
            let node = root.get(&path)?.clone();
            node.is_scalar().then_some((path, node))
        })
        .collect();
    leaves.sort_by(|a, b| a.0.cmp(&b.0));
    leaves
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// from_json(to_json(tree)) == tree, including key order and number text.
    #[test]
    fn json_text_round_trip(tree in arb_tree()) {
        let text = tree.to_json().unwrap();
        let back = Value::from_json(&text).unwrap();
        prop_assert_eq!(&back, &tree, "JSON: {}", text);
    }

    /// deserialize(serialize(tree)) holds the same scalar leaves.
    #[test]
    fn compact_round_trip(tree in arb_tree()) {
        let form = serialize(&tree).unwrap();
        let back = deserialize(&form).unwrap();
        prop_assert_eq!(scalar_leaves(&back), scalar_leaves(&tree));
    }

    /// Serialized paths are strictly ascending and the form says so.
    #[test]
    fn compact_paths_sorted(tree in arb_tree()) {
        let form = serialize(&tree).unwrap();
        let paths = form.paths().unwrap();
        prop_assert!(form.is_sorted());
        prop_assert!(paths.windows(2).all(|w| w[0] < w[1]));
    }

    /// Windowed binary search agrees with a linear scan for every stored path.
    #[test]
    fn binary_search_matches_scan(tree in arb_tree()) {
        let form = serialize(&tree).unwrap();
        for path in form.paths().unwrap() {
            let windowed = form.lookup(path, Some(0..form.len())).unwrap();
            let scanned = form.lookup(path, None).unwrap();
            prop_assert!(windowed.is_some(), "missing {}", path);
            prop_assert_eq!(windowed, scanned);
        }
    }

    /// Paths that were never stored are not found either way.
    #[test]
    fn absent_paths_not_found(tree in arb_tree(), suffix in "[a-z]{1,4}") {
        let form = serialize(&tree).unwrap();
        let stored: HashSet<&str> = form.paths().unwrap().into_iter().collect();
        for path in form.paths().unwrap() {
            let absent = format!("{path}/{suffix}");
            prop_assume!(!stored.contains(absent.as_str()));
            prop_assert_eq!(form.lookup(&absent, Some(0..form.len())).unwrap(), None);
            prop_assert_eq!(form.lookup(&absent, None).unwrap(), None);
        }
    }

    /// Every enumerated path resolves, and a stored leaf's lookup text is its
    /// tree text.
    #[test]
    fn lookup_matches_tree(tree in arb_tree()) {
        let form = serialize(&tree).unwrap();
        for (path, node) in scalar_leaves(&tree) {
            let text = form.lookup_text(&path, Some(0..form.len())).unwrap();
            prop_assert_eq!(text, node.to_text());
        }
    }
}
