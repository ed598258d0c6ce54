use plugframe_types::{AttributePath, AttributePathStep};
use serde_json::json;

// ── Building ─────────────────────────────────────────────────────

#[test]
fn new_path_is_empty() {
    let p = AttributePath::new();
    assert!(p.is_empty());
    assert_eq!(p.len(), 0);
    assert!(p.last_step().is_none());
}

#[test]
fn builders_append_in_order() {
    let p = AttributePath::root("tags")
        .with_element_key_string("env")
        .with_element_key_int(2);
    assert_eq!(
        p.steps(),
        &[
            AttributePathStep::AttributeName("tags".into()),
            AttributePathStep::ElementKeyString("env".into()),
            AttributePathStep::ElementKeyInt(2),
        ]
    );
}

#[test]
fn parent_drops_last_step() {
    let p = AttributePath::root("a").with_attribute_name("b");
    assert_eq!(p.parent(), AttributePath::root("a"));
    assert_eq!(AttributePath::new().parent(), AttributePath::new());
}

#[test]
fn display_joins_steps() {
    let p = AttributePath::root("rules").with_element_key_int(0);
    assert_eq!(p.to_string(), r#"AttributeName("rules").ElementKeyInt(0)"#);
}

// ── Value lookup ─────────────────────────────────────────────────

#[test]
fn value_in_follows_names_and_indexes() {
    let config = json!({"rules": [{"port": 22}, {"port": 443}]});
    let p = AttributePath::root("rules")
        .with_element_key_int(1)
        .with_attribute_name("port");
    assert_eq!(p.value_in(&config), Some(&json!(443)));
}

#[test]
fn value_in_map_key() {
    let config = json!({"labels": {"env": "prod"}});
    let p = AttributePath::root("labels").with_element_key_string("env");
    assert_eq!(p.value_in(&config), Some(&json!("prod")));
}

#[test]
fn value_in_set_element() {
    let config = json!({"zones": ["a", "b"]});
    let p = AttributePath::root("zones").with_element_key_value(json!("b"));
    assert_eq!(p.value_in(&config), Some(&json!("b")));
}

#[test]
fn value_in_missing_returns_none() {
    let config = json!({"name": "x"});
    assert!(AttributePath::root("other").value_in(&config).is_none());
    assert!(AttributePath::root("name")
        .with_element_key_int(0)
        .value_in(&config)
        .is_none());
    assert!(AttributePath::root("name")
        .with_element_key_int(-1)
        .value_in(&json!({"name": [1]}))
        .is_none());
}

#[test]
fn empty_path_addresses_root() {
    let config = json!({"a": 1});
    assert_eq!(AttributePath::new().value_in(&config), Some(&config));
}
