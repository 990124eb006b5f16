use jtree_core::{Delimiter, TreeError, Value};

fn tree(json: &str) -> Value {
    Value::from_json(json).unwrap()
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn json_pretty_is_indented() {
    let v = tree(r#"{"a":[1,2]}"#);
    assert_eq!(v.to_json_pretty().unwrap(), "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
}

#[test]
fn json_escapes_strings() {
    let v = tree(r#"{"q":"say \"hi\"\n"}"#);
    assert_eq!(v.to_json().unwrap(), r#"{"q":"say \"hi\"\n"}"#);
}

// ============================================================================
// YAML
// ============================================================================

#[test]
fn yaml_nested() {
    let v = tree(r#"{"org":{"name":"jtree","tags":["a","b"],"n":3,"ok":true,"none":null}}"#);
    assert_eq!(
        v.to_yaml(),
        "---\norg:\n  name: jtree\n  tags:\n    - a\n    - b\n  n: 3\n  ok: true\n  none:\n"
    );
}

#[test]
fn yaml_empty_containers() {
    let v = tree(r#"{"a":[],"b":{}}"#);
    assert_eq!(v.to_yaml(), "---\na: []\nb: {}\n");
}

#[test]
fn yaml_scalar_root() {
    assert_eq!(Value::from("text").to_yaml(), "--- text\n");
}

// ============================================================================
// XML
// ============================================================================

#[test]
fn xml_attributes_and_text() {
    let v = tree(r#"{"doc":{"@lang":"de","@v":2,"@text":"body"}}"#);
    assert_eq!(
        v.to_xml().unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n<doc lang=\"de\" v=\"2\">body</doc>\n"
    );
}

#[test]
fn xml_children_and_arrays() {
    let v = tree(r#"{"root":{"item":["a","b"],"child":{"x":"1 < 2"}}}"#);
    assert_eq!(
        v.to_xml().unwrap(),
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n",
            "<root>\n",
            "  <item>a</item>\n",
            "  <item>b</item>\n",
            "  <child>\n",
            "    <x>1 &lt; 2</x>\n",
            "  </child>\n",
            "</root>\n",
        )
    );
}

#[test]
fn xml_cdata() {
    let v = tree(r#"{"s":{"@cdata":"<raw>"}}"#);
    assert!(v.to_xml().unwrap().ends_with("<s><![CDATA[<raw>]]></s>\n"));
}

#[test]
fn xml_needs_single_root_key() {
    assert!(matches!(tree(r#"{"a":1,"b":2}"#).to_xml(), Err(TreeError::Render(_))));
    assert!(matches!(tree("[1]").to_xml(), Err(TreeError::Render(_))));
}

// ============================================================================
// CSV
// ============================================================================

#[test]
fn csv_rows_of_arrays() {
    let v = tree(r#"[["a",1,true],["b,c",null,"say \"x\""]]"#);
    assert_eq!(
        v.to_csv(Delimiter::Comma).unwrap(),
        "a,1,true\n\"b,c\",,\"say \"\"x\"\"\"\n"
    );
}

#[test]
fn csv_rows_of_objects_with_semicolon() {
    let v = tree(r#"[{"n":"a","v":1},{"n":"b","v":2}]"#);
    assert_eq!(v.to_csv(Delimiter::Semicolon).unwrap(), "a;1\nb;2\n");
}

#[test]
fn csv_needs_table() {
    assert!(matches!(Value::from("x").to_csv(Delimiter::Comma), Err(TreeError::Render(_))));
}
