//! Wire schema records and the attribute-to-wire conversion.
//!
//! The host does not preserve map ordering, so every attribute list here is
//! sorted by name before it leaves the process.

use crate::attribute::{Attribute, AttributeKind, NestedAttributes, NestingMode};
use crate::error::{SchemaError, SchemaResult};
use plugframe_types::{AttributePath, WireType};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static ATTRIBUTE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9_]+$").expect("attribute name pattern is a valid regex")
});

/// How a description string should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StringKind {
    Plain,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireSchema {
    pub version: i64,
    pub block: WireBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireBlock {
    pub attributes: Vec<WireAttribute>,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_kind: Option<StringKind>,
}

/// One attribute descriptor. Exactly one of `type` and `nested_type` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireAttribute {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<WireType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_type: Option<WireNestedType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_kind: Option<StringKind>,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireNestedType {
    pub nesting: NestingMode,
    pub attributes: Vec<WireAttribute>,
}

/// Picks the description to send: markdown wins over plain, and the kind
/// always matches the string actually chosen.
pub(crate) fn description_fields(
    plain: &str,
    markdown: &str,
) -> (Option<String>, Option<StringKind>) {
    if !markdown.is_empty() {
        (Some(markdown.to_owned()), Some(StringKind::Markdown))
    } else if !plain.is_empty() {
        (Some(plain.to_owned()), Some(StringKind::Plain))
    } else {
        (None, None)
    }
}

pub(crate) fn sort_by_name(attributes: &mut [WireAttribute]) {
    attributes.sort_by(|a, b| a.name.cmp(&b.name));
}

impl Attribute {
    /// Converts this attribute to its wire descriptor.
    ///
    /// Fails on names outside `[a-z0-9_]+`, on a missing
    /// required/optional/computed flag, on `required` combined with
    /// `optional` or `computed`, and on empty nested attributes.
    pub fn to_wire_attribute(
        &self,
        name: &str,
        path: &AttributePath,
    ) -> SchemaResult<WireAttribute> {
        if !ATTRIBUTE_NAME_RE.is_match(name) {
            return Err(SchemaError::InvalidAttributeName {
                name: name.to_owned(),
                path: path.clone(),
            });
        }

        if !self.required && !self.optional && !self.computed {
            return Err(SchemaError::InvalidAttributeFlags {
                path: path.clone(),
                reason: "must have Required, Optional, or Computed set",
            });
        }

        if self.required && (self.optional || self.computed) {
            return Err(SchemaError::InvalidAttributeFlags {
                path: path.clone(),
                reason: "cannot be Required together with Optional or Computed",
            });
        }

        let (r#type, nested_type) = match &self.kind {
            AttributeKind::Type(ty) => (Some(ty.terraform_type()), None),
            AttributeKind::Nested(nested) => (None, Some(nested.to_wire_nested_type(path)?)),
        };

        let (description, description_kind) =
            description_fields(&self.description, &self.markdown_description);

        Ok(WireAttribute {
            name: name.to_owned(),
            r#type,
            nested_type,
            description,
            description_kind,
            required: self.required,
            optional: self.optional,
            computed: self.computed,
            sensitive: self.sensitive,
            deprecated: !self.deprecation_message.is_empty(),
        })
    }
}

impl NestedAttributes {
    fn to_wire_nested_type(&self, path: &AttributePath) -> SchemaResult<WireNestedType> {
        let mut attributes = self
            .attributes
            .iter()
            .map(|(name, attr)| {
                attr.to_wire_attribute(name, &path.clone().with_attribute_name(name))
            })
            .collect::<SchemaResult<Vec<_>>>()?;

        sort_by_name(&mut attributes);

        if attributes.is_empty() {
            return Err(SchemaError::EmptyNestedAttributes { path: path.clone() });
        }

        Ok(WireNestedType {
            nesting: self.nesting,
            attributes,
        })
    }
}
