//! Configuration validation against a schema.

use crate::attribute::{Attribute, AttributeKind, Attributes, NestingMode};
use plugframe_types::{AttrType, AttributePath, Diagnostics};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::trace;

static NULL: Value = Value::Null;

/// Plugin-supplied check for a single attribute's value.
///
/// Implementations append to `resp.diagnostics`; they must not assume they
/// are the only contributor.
pub trait AttributeValidator: Send + Sync {
    /// Plain-text description for documentation.
    fn description(&self) -> String;

    fn validate(&self, req: &ValidateAttributeRequest<'_>, resp: &mut ValidateAttributeResponse);
}

#[derive(Debug, Clone, Default)]
pub struct ValidateSchemaRequest {
    /// The whole configuration object. `null` and absent are equivalent.
    pub config: Value,
}

#[derive(Debug, Clone, Default)]
pub struct ValidateSchemaResponse {
    pub diagnostics: Diagnostics,
}

/// Input for validating one attribute.
#[derive(Debug, Clone)]
pub struct ValidateAttributeRequest<'a> {
    pub attribute_path: AttributePath,
    /// The value at `attribute_path`, or `null` when unset.
    pub attribute_config: &'a Value,
    /// The whole configuration, for validators that compare attributes.
    pub config: &'a Value,
}

impl<'a> ValidateAttributeRequest<'a> {
    pub fn new(attribute_path: AttributePath, config: &'a Value) -> Self {
        let attribute_config = attribute_path.value_in(config).unwrap_or(&NULL);
        Self {
            attribute_path,
            attribute_config,
            config,
        }
    }

    pub fn is_set(&self) -> bool {
        !self.attribute_config.is_null()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidateAttributeResponse {
    pub diagnostics: Diagnostics,
}

impl Attribute {
    /// Validates the configured value of this attribute and, for branches,
    /// of every child.
    ///
    /// Plugin validators are skipped once `ctx` is cancelled; the skip is
    /// recorded as an error so the request cannot silently pass.
    pub fn validate(
        &self,
        ctx: &CancellationToken,
        req: &ValidateAttributeRequest<'_>,
        resp: &mut ValidateAttributeResponse,
    ) {
        let path = &req.attribute_path;

        if self.required && !req.is_set() {
            resp.diagnostics.add_attribute_error(
                path.clone(),
                "Missing Configuration for Required Attribute",
                format!(
                    "Must set a configuration value for the {path} attribute as the provider \
                     has marked it as required."
                ),
            );
        }

        if self.computed && !self.optional && req.is_set() {
            resp.diagnostics.add_attribute_error(
                path.clone(),
                "Invalid Configuration for Read-Only Attribute",
                format!(
                    "Cannot set value for the {path} attribute as the provider has marked it \
                     as read-only. Remove the configuration line setting the value."
                ),
            );
        }

        let conforms = !req.is_set() || self.value_conforms(req.attribute_config);
        if !conforms {
            resp.diagnostics.add_attribute_error(
                path.clone(),
                "Invalid Attribute Value Type",
                format!(
                    "The {path} attribute expects a value of type {}, \
                     but the configured value is {}.",
                    self.terraform_type(),
                    value_kind(req.attribute_config),
                ),
            );
        }

        if conforms && !self.validators.is_empty() {
            if ctx.is_cancelled() {
                resp.diagnostics.add_attribute_error(
                    path.clone(),
                    "Validation Cancelled",
                    format!(
                        "Validation of the {path} attribute was cancelled before it completed."
                    ),
                );
            } else {
                trace!(
                    attribute = %path,
                    count = self.validators.len(),
                    "Calling attribute validators"
                );
                for validator in &self.validators {
                    validator.validate(req, resp);
                }
            }
        }

        if let AttributeKind::Nested(nested) = &self.kind {
            if conforms && req.is_set() {
                validate_nested(ctx, nested.nesting, &nested.attributes, req, resp);
            }
        }

        if req.is_set() && !self.deprecation_message.is_empty() {
            resp.diagnostics.add_attribute_warning(
                path.clone(),
                "Attribute Deprecated",
                self.deprecation_message.clone(),
            );
        }
    }

    /// Whether a non-null value has this attribute's shape. Branches only
    /// check their container; children are checked when they are visited.
    fn value_conforms(&self, value: &Value) -> bool {
        match &self.kind {
            AttributeKind::Type(ty) => value_conforms(ty, value),
            AttributeKind::Nested(nested) => match nested.nesting {
                NestingMode::Single => value.is_object(),
                NestingMode::List | NestingMode::Set => value
                    .as_array()
                    .is_some_and(|items| items.iter().all(is_object_or_null)),
                NestingMode::Map => value
                    .as_object()
                    .is_some_and(|entries| entries.values().all(is_object_or_null)),
            },
        }
    }
}

fn is_object_or_null(value: &Value) -> bool {
    value.is_object() || value.is_null()
}

/// Null conforms to every type. Object values may leave fields out but
/// must not carry fields the type does not declare.
fn value_conforms(ty: &AttrType, value: &Value) -> bool {
    if value.is_null() {
        return true;
    }
    match ty {
        AttrType::String => value.is_string(),
        AttrType::Number => value.is_number(),
        AttrType::Bool => value.is_boolean(),
        AttrType::List(elem) | AttrType::Set(elem) => value
            .as_array()
            .is_some_and(|items| items.iter().all(|item| value_conforms(elem, item))),
        AttrType::Map(elem) => value
            .as_object()
            .is_some_and(|entries| entries.values().all(|entry| value_conforms(elem, entry))),
        AttrType::Object(object) => value.as_object().is_some_and(|fields| {
            fields
                .iter()
                .all(|(name, field)| object.get(name).is_some_and(|ft| value_conforms(ft, field)))
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Collects the paths of every element the nesting mode produces, then
/// validates each child attribute under each of them.
fn validate_nested(
    ctx: &CancellationToken,
    nesting: NestingMode,
    attributes: &Attributes,
    req: &ValidateAttributeRequest<'_>,
    resp: &mut ValidateAttributeResponse,
) {
    let path = &req.attribute_path;
    let element_paths: Vec<AttributePath> = match nesting {
        NestingMode::Single => {
            if req.attribute_config.is_object() {
                vec![path.clone()]
            } else {
                Vec::new()
            }
        }
        NestingMode::List => req
            .attribute_config
            .as_array()
            .map(|items| {
                (0..items.len())
                    .map(|i| path.clone().with_element_key_int(i as i64))
                    .collect()
            })
            .unwrap_or_default(),
        NestingMode::Set => {
            let items = req.attribute_config.as_array().map(Vec::as_slice).unwrap_or_default();
            let mut seen: Vec<&Value> = Vec::new();
            let mut paths = Vec::new();
            for item in items {
                let element_path = path.clone().with_element_key_value(item.clone());
                if seen.contains(&item) {
                    resp.diagnostics.add_attribute_error(
                        element_path,
                        "Duplicate Set Element",
                        format!("This attribute contains duplicate values of: {item}"),
                    );
                    continue;
                }
                seen.push(item);
                paths.push(element_path);
            }
            paths
        }
        NestingMode::Map => req
            .attribute_config
            .as_object()
            .map(|entries| {
                entries
                    .keys()
                    .map(|key| path.clone().with_element_key_string(key.clone()))
                    .collect()
            })
            .unwrap_or_default(),
    };

    for element_path in element_paths {
        for (name, attribute) in attributes.iter() {
            let child_path = element_path.clone().with_attribute_name(name);
            let child_req = ValidateAttributeRequest::new(child_path, req.config);
            attribute.validate(ctx, &child_req, resp);
        }
    }
}
