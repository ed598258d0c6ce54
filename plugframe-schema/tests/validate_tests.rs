use plugframe_schema::{
    Attribute, AttributeValidator, Attributes, NestedAttributes, Schema, ValidateAttributeRequest,
    ValidateAttributeResponse, ValidateSchemaRequest, ValidateSchemaResponse,
};
use plugframe_types::{AttrType, AttributePath, ObjectType, Severity};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Rejects strings shorter than `min`.
struct MinLength {
    min: usize,
}

impl AttributeValidator for MinLength {
    fn description(&self) -> String {
        format!("string length must be at least {}", self.min)
    }

    fn validate(&self, req: &ValidateAttributeRequest<'_>, resp: &mut ValidateAttributeResponse) {
        if let Some(s) = req.attribute_config.as_str() {
            if s.len() < self.min {
                resp.diagnostics.add_attribute_error(
                    req.attribute_path.clone(),
                    "Invalid Attribute Value Length",
                    self.description(),
                );
            }
        }
    }
}

/// Always emits one error, and counts calls.
#[derive(Clone, Default)]
struct AlwaysFails {
    calls: Arc<AtomicUsize>,
}

impl AttributeValidator for AlwaysFails {
    fn description(&self) -> String {
        "always fails".into()
    }

    fn validate(&self, req: &ValidateAttributeRequest<'_>, resp: &mut ValidateAttributeResponse) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        resp.diagnostics
            .add_attribute_error(req.attribute_path.clone(), "Always Fails", "");
    }
}

/// Warns on every call.
struct AlwaysWarns;

impl AttributeValidator for AlwaysWarns {
    fn description(&self) -> String {
        "always warns".into()
    }

    fn validate(&self, req: &ValidateAttributeRequest<'_>, resp: &mut ValidateAttributeResponse) {
        resp.diagnostics
            .add_attribute_warning(req.attribute_path.clone(), "Heads Up", "");
    }
}

fn run(schema: &Schema, config: Value) -> ValidateSchemaResponse {
    let req = ValidateSchemaRequest { config };
    let mut resp = ValidateSchemaResponse::default();
    schema.validate(&CancellationToken::new(), &req, &mut resp);
    resp
}

fn summaries(resp: &ValidateSchemaResponse) -> Vec<&str> {
    resp.diagnostics.iter().map(|d| d.summary.as_str()).collect()
}

// ── Required / computed ──────────────────────────────────────────

#[test]
fn valid_config_has_no_diagnostics() {
    let s = Schema::new()
        .with_attribute("name", Attribute::required_string())
        .with_attribute("id", Attribute::computed_string());
    let resp = run(&s, json!({"name": "web"}));
    assert!(resp.diagnostics.is_empty());
}

#[test]
fn missing_required_attribute_errors() {
    let s = Schema::new().with_attribute("name", Attribute::required_string());
    let resp = run(&s, json!({}));
    assert!(resp.diagnostics.has_error());
    let diag = &resp.diagnostics.as_slice()[0];
    assert_eq!(diag.summary, "Missing Configuration for Required Attribute");
    assert_eq!(diag.attribute, Some(AttributePath::root("name")));
}

#[test]
fn null_counts_as_missing() {
    let s = Schema::new().with_attribute("name", Attribute::required_string());
    assert!(run(&s, json!({"name": null})).diagnostics.has_error());
    assert!(run(&s, Value::Null).diagnostics.has_error());
}

#[test]
fn setting_read_only_attribute_errors() {
    let s = Schema::new().with_attribute("id", Attribute::computed_string());
    let resp = run(&s, json!({"id": "abc"}));
    assert_eq!(summaries(&resp), vec!["Invalid Configuration for Read-Only Attribute"]);
}

#[test]
fn optional_computed_may_be_set() {
    let s = Schema::new().with_attribute("id", Attribute::optional_string().computed());
    assert!(run(&s, json!({"id": "abc"})).diagnostics.is_empty());
}

// ── Validators ───────────────────────────────────────────────────

#[test]
fn validators_receive_attribute_value() {
    let s = Schema::new().with_attribute(
        "name",
        Attribute::required_string().with_validator(MinLength { min: 3 }),
    );
    assert!(run(&s, json!({"name": "web"})).diagnostics.is_empty());
    let resp = run(&s, json!({"name": "w"}));
    assert_eq!(summaries(&resp), vec!["Invalid Attribute Value Length"]);
}

#[test]
fn mixed_validity_visits_every_attribute() {
    let failing = AlwaysFails::default();
    let s = Schema::new()
        .with_attribute("a1", Attribute::optional_string().with_validator(AlwaysWarns))
        .with_attribute("a2", Attribute::optional_string().with_validator(AlwaysWarns))
        .with_attribute("a3", Attribute::optional_string().with_validator(failing.clone()))
        .with_attribute("a4", Attribute::optional_string().with_validator(AlwaysWarns))
        .with_attribute("a5", Attribute::optional_string().with_validator(AlwaysWarns));
    let resp = run(&s, json!({}));

    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    assert_eq!(resp.diagnostics.error_count(), 1);
    assert_eq!(resp.diagnostics.warning_count(), 4);

    let mut warned: Vec<_> = resp
        .diagnostics
        .warnings()
        .filter_map(|d| d.attribute.as_ref().map(ToString::to_string))
        .collect();
    warned.sort();
    assert_eq!(
        warned,
        vec![
            AttributePath::root("a1").to_string(),
            AttributePath::root("a2").to_string(),
            AttributePath::root("a4").to_string(),
            AttributePath::root("a5").to_string(),
        ]
    );
}

#[test]
fn every_attribute_keeps_its_own_errors() {
    let s = Schema::new()
        .with_attribute("a", Attribute::required_string())
        .with_attribute("b", Attribute::required_string())
        .with_attribute("c", Attribute::required_string());
    assert_eq!(run(&s, json!({})).diagnostics.error_count(), 3);
}

#[test]
fn cancelled_context_skips_validators() {
    let failing = AlwaysFails::default();
    let s = Schema::new()
        .with_attribute("a", Attribute::optional_string().with_validator(failing.clone()))
        .with_deprecation_message("old");
    let ctx = CancellationToken::new();
    ctx.cancel();

    let mut resp = ValidateSchemaResponse::default();
    s.validate(&ctx, &ValidateSchemaRequest { config: json!({}) }, &mut resp);

    assert_eq!(failing.calls.load(Ordering::SeqCst), 0);
    assert_eq!(summaries(&resp), vec!["Validation Cancelled", "Deprecated"]);
}

// ── Deprecation ──────────────────────────────────────────────────

#[test]
fn schema_deprecation_adds_one_warning() {
    let s = Schema::new()
        .with_deprecation_message("Use example_v2 instead.")
        .with_attribute("name", Attribute::optional_string());
    let resp = run(&s, json!({}));
    assert_eq!(resp.diagnostics.len(), 1);
    let diag = &resp.diagnostics.as_slice()[0];
    assert_eq!(diag.severity, Severity::Warning);
    assert_eq!(diag.summary, "Deprecated");
    assert_eq!(diag.detail, "Use example_v2 instead.");
    assert!(diag.attribute.is_none());
}

#[test]
fn schema_deprecation_survives_attribute_errors() {
    let s = Schema::new()
        .with_deprecation_message("old")
        .with_attribute("a", Attribute::required_string())
        .with_attribute("b", Attribute::required_string());
    let resp = run(&s, json!({}));
    assert_eq!(resp.diagnostics.error_count(), 2);
    let deprecated: Vec<_> = resp
        .diagnostics
        .warnings()
        .filter(|d| d.summary == "Deprecated")
        .collect();
    assert_eq!(deprecated.len(), 1);
    assert_eq!(resp.diagnostics.as_slice().last().unwrap().summary, "Deprecated");
}

#[test]
fn schema_deprecation_on_empty_schema() {
    let s = Schema::new().with_deprecation_message("old");
    assert_eq!(summaries(&run(&s, json!({}))), vec!["Deprecated"]);
}

#[test]
fn attribute_deprecation_only_when_set() {
    let s = Schema::new().with_attribute(
        "legacy",
        Attribute::optional_string().with_deprecation_message("use modern"),
    );
    assert!(run(&s, json!({})).diagnostics.is_empty());

    let resp = run(&s, json!({"legacy": "x"}));
    let diag = &resp.diagnostics.as_slice()[0];
    assert_eq!(diag.summary, "Attribute Deprecated");
    assert_eq!(diag.detail, "use modern");
    assert_eq!(diag.attribute, Some(AttributePath::root("legacy")));
}

// ── Nested attributes ────────────────────────────────────────────

fn rules_schema() -> Schema {
    Schema::new().with_attribute(
        "rules",
        Attribute::nested(NestedAttributes::list(
            Attributes::new()
                .with("cidr", Attribute::required_string())
                .with("description", Attribute::optional_string()),
        ))
        .optional(),
    )
}

#[test]
fn list_nested_validates_each_element() {
    let resp = run(
        &rules_schema(),
        json!({"rules": [{"cidr": "10.0.0.0/8"}, {"description": "no cidr"}]}),
    );
    assert_eq!(resp.diagnostics.error_count(), 1);
    assert_eq!(
        resp.diagnostics.as_slice()[0].attribute,
        Some(
            AttributePath::root("rules")
                .with_element_key_int(1)
                .with_attribute_name("cidr")
        )
    );
}

#[test]
fn unset_nested_skips_children() {
    assert!(run(&rules_schema(), json!({})).diagnostics.is_empty());
}

#[test]
fn single_nested_validates_children() {
    let s = Schema::new().with_attribute(
        "endpoint",
        Attribute::nested(NestedAttributes::single(
            Attributes::new().with("host", Attribute::required_string()),
        ))
        .optional(),
    );
    let resp = run(&s, json!({"endpoint": {}}));
    assert_eq!(
        resp.diagnostics.as_slice()[0].attribute,
        Some(AttributePath::root("endpoint").with_attribute_name("host"))
    );
}

#[test]
fn map_nested_validates_each_entry() {
    let s = Schema::new().with_attribute(
        "backends",
        Attribute::nested(NestedAttributes::map(
            Attributes::new().with("port", Attribute::required_number()),
        ))
        .optional(),
    );
    let resp = run(&s, json!({"backends": {"a": {"port": 80}, "b": {}}}));
    assert_eq!(resp.diagnostics.error_count(), 1);
    assert_eq!(
        resp.diagnostics.as_slice()[0].attribute,
        Some(
            AttributePath::root("backends")
                .with_element_key_string("b")
                .with_attribute_name("port")
        )
    );
}

#[test]
fn set_nested_validates_each_element() {
    let s = Schema::new().with_attribute(
        "members",
        Attribute::nested(NestedAttributes::set(
            Attributes::new().with("user", Attribute::required_string()),
        ))
        .optional(),
    );
    let resp = run(&s, json!({"members": [{"user": "a"}, {"role": "x"}]}));
    assert_eq!(resp.diagnostics.error_count(), 1);
}

#[test]
fn validators_see_whole_config() {
    struct NeedsSibling;
    impl AttributeValidator for NeedsSibling {
        fn description(&self) -> String {
            "requires port".into()
        }
        fn validate(
            &self,
            req: &ValidateAttributeRequest<'_>,
            resp: &mut ValidateAttributeResponse,
        ) {
            if req.is_set() && req.config.get("port").is_none() {
                resp.diagnostics.add_attribute_error(
                    req.attribute_path.clone(),
                    "Missing Attribute Configuration",
                    self.description(),
                );
            }
        }
    }

    let s = Schema::new()
        .with_attribute("host", Attribute::optional_string().with_validator(NeedsSibling))
        .with_attribute("port", Attribute::new(AttrType::Number).optional());
    assert!(run(&s, json!({"host": "h", "port": 1})).diagnostics.is_empty());
    assert!(run(&s, json!({"host": "h"})).diagnostics.has_error());
}

#[test]
fn validator_debug_shows_description() {
    let attr = Attribute::optional_string().with_validator(MinLength { min: 2 });
    let debug = format!("{attr:?}");
    assert!(debug.contains("string length must be at least 2"));
}

#[test]
fn duplicate_set_elements_reported_once() {
    let s = Schema::new().with_attribute(
        "members",
        Attribute::nested(NestedAttributes::set(
            Attributes::new().with("user", Attribute::required_string()),
        ))
        .optional(),
    );
    let resp = run(&s, json!({"members": [{"role": "x"}, {"role": "x"}]}));

    assert_eq!(
        summaries(&resp),
        vec!["Duplicate Set Element", "Missing Configuration for Required Attribute"]
    );
    let element = AttributePath::root("members").with_element_key_value(json!({"role": "x"}));
    assert_eq!(resp.diagnostics.as_slice()[0].attribute, Some(element.clone()));
    assert_eq!(
        resp.diagnostics.as_slice()[1].attribute,
        Some(element.with_attribute_name("user"))
    );
}

// ── Value types ──────────────────────────────────────────────────

#[test]
fn leaf_type_mismatch_errors_and_skips_validators() {
    let failing = AlwaysFails::default();
    let s = Schema::new().with_attribute(
        "port",
        Attribute::required_number().with_validator(failing.clone()),
    );
    let resp = run(&s, json!({"port": "not a number"}));

    assert_eq!(summaries(&resp), vec!["Invalid Attribute Value Type"]);
    assert_eq!(resp.diagnostics.as_slice()[0].attribute, Some(AttributePath::root("port")));
    assert_eq!(failing.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn nested_container_mismatch_errors_without_visiting_children() {
    let s = Schema::new()
        .with_attribute("port", Attribute::required_number())
        .with_attribute(
            "rules",
            Attribute::nested(NestedAttributes::list(
                Attributes::new().with("cidr", Attribute::required_string()),
            ))
            .required(),
        );
    let resp = run(&s, json!({"port": "not a number", "rules": "oops"}));

    assert_eq!(resp.diagnostics.error_count(), 2);
    let paths: Vec<_> = resp.diagnostics.iter().map(|d| d.attribute.clone()).collect();
    assert_eq!(
        paths,
        vec![Some(AttributePath::root("port")), Some(AttributePath::root("rules"))]
    );
    assert!(resp.diagnostics.iter().all(|d| d.summary == "Invalid Attribute Value Type"));
}

#[test]
fn collection_elements_are_type_checked() {
    let s = Schema::new()
        .with_attribute("ports", Attribute::new(AttrType::list(AttrType::Number)).optional())
        .with_attribute("labels", Attribute::new(AttrType::map(AttrType::String)).optional());

    let valid = json!({"ports": [80, null], "labels": {"env": "prod"}});
    assert!(run(&s, valid).diagnostics.is_empty());
    assert_eq!(
        summaries(&run(&s, json!({"ports": [80, "443"]}))),
        vec!["Invalid Attribute Value Type"]
    );
    assert_eq!(
        summaries(&run(&s, json!({"labels": ["prod"]}))),
        vec!["Invalid Attribute Value Type"]
    );
}

#[test]
fn object_values_reject_undeclared_fields() {
    let endpoint = AttrType::Object(
        ObjectType::new()
            .with_attribute("host", AttrType::String)
            .with_attribute("port", AttrType::Number),
    );
    let s = Schema::new().with_attribute("endpoint", Attribute::new(endpoint).optional());

    assert!(run(&s, json!({"endpoint": {"host": "h"}})).diagnostics.is_empty());
    assert!(run(&s, json!({"endpoint": {"host": "h", "extra": 1}})).diagnostics.has_error());
    assert!(run(&s, json!({"endpoint": {"port": "80"}})).diagnostics.has_error());
}

#[test]
fn map_nested_entries_must_be_objects() {
    let s = Schema::new().with_attribute(
        "backends",
        Attribute::nested(NestedAttributes::map(
            Attributes::new().with("port", Attribute::optional_bool()),
        ))
        .optional(),
    );
    let resp = run(&s, json!({"backends": {"a": 80}}));
    assert_eq!(summaries(&resp), vec!["Invalid Attribute Value Type"]);
    assert_eq!(
        resp.diagnostics.as_slice()[0].attribute,
        Some(AttributePath::root("backends"))
    );
}
