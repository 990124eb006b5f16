use jtree_core::{Coercion, PathFilter, TreeError, Value};

fn tree(json: &str) -> Value {
    Value::from_json(json).unwrap()
}

fn json(v: &Value) -> String {
    v.to_json().unwrap()
}

// ============================================================================
// Reading
// ============================================================================

#[test]
fn get_by_key_and_index() {
    let v = tree(r#"{"a":[{"b":1},{"b":"two"}]}"#);
    assert_eq!(v.get("a/[1]/b").and_then(Value::as_str), Some("two"));
    assert_eq!(v.get("a/[0]/b").and_then(Value::as_i64), Some(1));
}

#[test]
fn get_empty_path_is_root() {
    let v = tree(r#"{"a":1}"#);
    assert!(std::ptr::eq(v.get("").unwrap(), &v));
}

#[test]
fn get_missing_is_none() {
    let v = tree(r#"{"a":[1]}"#);
    assert!(v.get("b").is_none());
    assert!(v.get("a/[5]").is_none());
    assert!(v.get("a/[0]/deeper").is_none());
}

#[test]
fn get_malformed_is_none() {
    let v = tree(r#"{"a":[1]}"#);
    assert!(v.get("a/[x]").is_none());
    assert!(v.get("a/[-1]").is_none());
}

#[test]
fn get_wildcard_picks_first_child() {
    let v = tree(r#"{"a":[{"b":1},{"b":2}]}"#);
    assert_eq!(v.get("a//b").and_then(Value::to_text), Some("1"));
    assert_eq!(v.get("/[0]/b").and_then(Value::to_text), Some("1"));
}

#[test]
fn index_on_object_reads_nth_member() {
    let v = tree(r#"{"k":{"x":1,"y":2}}"#);
    assert_eq!(v.get("k/[1]").and_then(Value::to_text), Some("2"));
}

#[test]
fn escaped_key_is_addressable() {
    let v = tree(r#"{"a/b":{"[c]":"v","100%":"p"}}"#);
    assert_eq!(v.get("a%2Fb/%5Bc]").and_then(Value::as_str), Some("v"));
    assert_eq!(v.get("a%2Fb/100%25").and_then(Value::as_str), Some("p"));
}

// ============================================================================
// Creating
// ============================================================================

#[test]
fn create_builds_intermediate_nodes() {
    let mut v = Value::Null;
    v.set_string_at("org/freedesktop/name", "jtree").unwrap();
    assert_eq!(json(&v), r#"{"org":{"freedesktop":{"name":"jtree"}}}"#);
}

#[test]
fn create_pads_arrays_with_null() {
    let v = Value::new_at("a/[2]").unwrap();
    assert_eq!(json(&v), r#"{"a":[null,null,null]}"#);
}

#[test]
fn create_appends() {
    let mut v = Value::Null;
    v.set_int_at("list/[]", 1).unwrap();
    v.set_int_at("list/[]", 2).unwrap();
    assert_eq!(json(&v), r#"{"list":[1,2]}"#);
}

#[test]
fn create_reuses_existing_key() {
    let mut v = tree(r#"{"a":{"x":1}}"#);
    v.set_int_at("a/y", 2).unwrap();
    v.set_int_at("a/x", 3).unwrap();
    assert_eq!(json(&v), r#"{"a":{"x":3,"y":2}}"#);
}

#[test]
fn create_with_escaped_key() {
    let mut v = Value::Null;
    v.set_string_at("a%2Fb/c", "v").unwrap();
    assert_eq!(json(&v), r#"{"a/b":{"c":"v"}}"#);
    assert_eq!(v.to_paths(0, PathFilter::Leaves), ["a%2Fb/c"]);
}

#[test]
fn coercion_replaces_mismatching_kinds() {
    let mut v = Value::new_at("a/[0]").unwrap();
    assert_eq!(json(&v), r#"{"a":[null]}"#);
    v.create("a/k").unwrap();
    assert_eq!(json(&v), r#"{"a":{"k":null}}"#);
}

#[test]
fn coercion_destroys_scalar() {
    let mut v = tree(r#"{"a":"text"}"#);
    v.set_bool_at("a/[0]", true).unwrap();
    assert_eq!(json(&v), r#"{"a":[true]}"#);
}

#[test]
fn strict_mode_refuses_coercion() {
    let mut v = tree(r#"{"a":"text"}"#);
    let err = v.create_with("a/[0]", Coercion::Strict).unwrap_err();
    assert!(matches!(err, TreeError::TypeMismatch { .. }));
    assert_eq!(json(&v), r#"{"a":"text"}"#);
}

#[test]
fn strict_mode_fills_null() {
    let mut v = tree(r#"{"a":null}"#);
    v.create_with("a/[0]", Coercion::Strict).unwrap();
    v.create_with("b/c", Coercion::Strict).unwrap();
    assert_eq!(json(&v), r#"{"a":[null],"b":{"c":null}}"#);
}

#[test]
fn unallocatable_index_leaves_tree_unchanged() {
    let mut v = tree(r#"["keep"]"#);
    for index in [usize::MAX, usize::MAX / 16] {
        let err = v.create(&format!("[{index}]")).unwrap_err();
        assert!(matches!(err, TreeError::CapacityExceeded { .. }));
    }
    assert_eq!(json(&v), r#"["keep"]"#);
}

#[test]
fn unallocatable_index_does_not_coerce() {
    let mut v = tree(r#"{"a":"text"}"#);
    let path = format!("a/[{}]", usize::MAX / 16);
    let err = v.create(&path).unwrap_err();
    assert!(matches!(err, TreeError::CapacityExceeded { .. }));
    assert_eq!(json(&v), r#"{"a":"text"}"#);
    assert!(v.set_int_at(&path, 1).is_err());
    assert_eq!(json(&v), r#"{"a":"text"}"#);
}

#[test]
fn wildcard_cannot_create() {
    let mut v = Value::Null;
    let err = v.create("a//b").unwrap_err();
    assert!(matches!(err, TreeError::MalformedPath { .. }));
}

#[test]
fn malformed_create_is_an_error() {
    let mut v = Value::Null;
    assert!(matches!(
        v.create("a/[x]"),
        Err(TreeError::MalformedPath { .. })
    ));
}

#[test]
fn typed_setters() {
    let mut v = Value::Null;
    v.set_double_at("d", 1.5).unwrap();
    v.set_int_at("i", -4).unwrap();
    v.set_bool_at("b", false).unwrap();
    assert_eq!(v.get("d").and_then(Value::as_f64), Some(1.5));
    assert_eq!(v.get("i").and_then(Value::as_i64), Some(-4));
    assert_eq!(v.get("b").and_then(Value::as_bool), Some(false));
    assert_eq!(json(&v), r#"{"d":1.5,"i":-4,"b":false}"#);
}

// ============================================================================
// Deleting
// ============================================================================

#[test]
fn delete_leaf_keeps_siblings() {
    let mut v = tree(r#"{"a":{"b":1,"c":2}}"#);
    assert!(v.delete("a/b"));
    assert_eq!(json(&v), r#"{"a":{"c":2}}"#);
}

#[test]
fn delete_cascades_through_empty_parents() {
    let mut v = tree(r#"{"x":1,"a":{"b":{"c":1}}}"#);
    assert!(v.delete("a/b/c"));
    assert_eq!(json(&v), r#"{"x":1}"#);
}

#[test]
fn delete_last_leaf_clears_root() {
    let mut v = tree(r#"{"a":{"b":1}}"#);
    assert!(v.delete("a/b"));
    assert!(v.is_null());
}

#[test]
fn delete_array_element_shifts() {
    let mut v = tree(r#"{"a":[1,2,3]}"#);
    assert!(v.delete("a/[0]"));
    assert_eq!(json(&v), r#"{"a":[2,3]}"#);
}

#[test]
fn delete_missing_is_false() {
    let mut v = tree(r#"{"a":1}"#);
    assert!(!v.delete("b"));
    assert!(!v.delete("a/[0]"));
    assert!(!v.delete(""));
    assert_eq!(json(&v), r#"{"a":1}"#);
}

// ============================================================================
// Reverse lookup
// ============================================================================

#[test]
fn path_of_finds_node_by_identity() {
    let v = tree(r#"{"a":[1,2],"b":2}"#);
    let node = v.get("a/[1]").unwrap();
    assert_eq!(v.path_of(node).as_deref(), Some("a/[1]"));
    assert_eq!(v.path_of(&v).as_deref(), Some(""));
    assert_eq!(v.path_of(&Value::from(2_i64)), None);
}

// ============================================================================
// Enumeration
// ============================================================================

#[test]
fn paths_in_insertion_order() {
    let v = tree(r#"{"z":1,"a":{"y":[true,null]}}"#);
    assert_eq!(
        v.to_paths(0, PathFilter::All),
        ["z", "a", "a/y", "a/y/[0]", "a/y/[1]"]
    );
}

#[test]
fn paths_respect_depth() {
    let v = tree(r#"{"a":{"b":{"c":1}},"d":2}"#);
    assert_eq!(v.to_paths(1, PathFilter::All), ["a", "d"]);
    assert_eq!(v.to_paths(2, PathFilter::All), ["a", "a/b", "d"]);
}

#[test]
fn empty_containers_are_leaves() {
    let v = tree(r#"{"a":[],"b":{}}"#);
    assert_eq!(v.to_paths(0, PathFilter::Leaves), ["a", "b"]);
    assert!(v.to_paths(0, PathFilter::Interior).is_empty());
}

#[test]
fn scalar_root_has_no_paths() {
    assert!(Value::from("x").to_paths(0, PathFilter::All).is_empty());
}

#[test]
fn find_paths_filters_by_xpath() {
    let v = tree(r#"{"a":{"b":{"c":1}},"d":2}"#);
    assert_eq!(v.find_paths("a", 0, PathFilter::All), ["a", "a/b", "a/b/c"]);
    assert_eq!(v.find_paths("//c", 0, PathFilter::All), ["a/b/c"]);
    assert!(v.find_paths("x", 0, PathFilter::All).is_empty());
}

#[test]
fn find_paths_with_index_term() {
    let v = tree(r#"{"list":[{"n":"a"},{"n":"b"}]}"#);
    assert_eq!(v.find_paths("list/[1]/n", 0, PathFilter::Leaves), ["list/[1]/n"]);
    assert_eq!(
        v.find_paths("list//n", 0, PathFilter::Leaves),
        ["list/[0]/n", "list/[1]/n"]
    );
}
