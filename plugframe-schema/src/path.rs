//! Schema-side path stepping.
//!
//! A walk through a schema can come to rest on one of four things, listed
//! in [`PathTarget`]. Once a step crosses from an attribute into its value
//! type, every later step stays inside [`PathTarget::Type`].

use crate::attribute::{Attribute, AttributeKind, Attributes, NestingMode};
use crate::schema::Schema;
use plugframe_types::{AttrType, AttributePathStep, AttributePathStepper, StepError};

/// Where a path walk through a schema ended.
#[derive(Debug, Clone)]
pub enum PathTarget<'a> {
    /// The schema root; only reached by an empty path.
    Schema(&'a Schema),
    /// One element of a list, set or map nested attribute: the children
    /// without an attribute of their own.
    Attributes(&'a Attributes),
    /// An attribute definition.
    Attribute(&'a Attribute),
    /// A position inside a leaf attribute's value.
    Type(AttrType),
}

impl PathTarget<'_> {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Schema(_) => "Schema",
            Self::Attributes(_) => "NestedAttributes",
            Self::Attribute(_) => "Attribute",
            Self::Type(_) => "AttrType",
        }
    }
}

fn lookup<'a>(
    attributes: &'a Attributes,
    step: &AttributePathStep,
    target: &str,
) -> Result<PathTarget<'a>, StepError> {
    match step {
        AttributePathStep::AttributeName(name) => attributes
            .get(name)
            .map(PathTarget::Attribute)
            .ok_or_else(|| StepError::AttributeNotFound {
                name: name.clone(),
                target: target.into(),
            }),
        _ => Err(StepError::CannotApply {
            step: step.to_string(),
            target: target.into(),
        }),
    }
}

impl<'a> AttributePathStepper for PathTarget<'a> {
    fn apply_step(&self, step: &AttributePathStep) -> Result<Self, StepError> {
        match self {
            Self::Schema(schema) => lookup(&schema.attributes, step, "schema"),
            Self::Attributes(attributes) => lookup(*attributes, step, "nested attributes"),
            Self::Attribute(attribute) => match &attribute.kind {
                AttributeKind::Type(ty) => ty.apply_step(step).map(Self::Type),
                AttributeKind::Nested(nested) => match (nested.nesting, step) {
                    (NestingMode::Single, AttributePathStep::AttributeName(_)) => {
                        lookup(&nested.attributes, step, "nested attributes")
                    }
                    (NestingMode::List, AttributePathStep::ElementKeyInt(_))
                    | (NestingMode::Set, AttributePathStep::ElementKeyValue(_))
                    | (NestingMode::Map, AttributePathStep::ElementKeyString(_)) => {
                        Ok(Self::Attributes(&nested.attributes))
                    }
                    (nesting, _) => Err(StepError::CannotApply {
                        step: step.to_string(),
                        target: format!("{nesting} nested attribute"),
                    }),
                },
            },
            Self::Type(ty) => ty.apply_step(step).map(Self::Type),
        }
    }
}
