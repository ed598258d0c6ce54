//! Structural paths into schemas and configuration values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single traversal step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributePathStep {
    /// Selects a named attribute of an object or schema.
    AttributeName(String),
    /// Selects a map entry by key.
    ElementKeyString(String),
    /// Selects a list element by index.
    ElementKeyInt(i64),
    /// Selects a set element by its value.
    ElementKeyValue(Value),
}

impl fmt::Display for AttributePathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeName(name) => write!(f, "AttributeName({name:?})"),
            Self::ElementKeyString(key) => write!(f, "ElementKeyString({key:?})"),
            Self::ElementKeyInt(index) => write!(f, "ElementKeyInt({index})"),
            Self::ElementKeyValue(value) => write!(f, "ElementKeyValue({value})"),
        }
    }
}

/// An ordered sequence of [`AttributePathStep`]s.
///
/// Paths are cheap, ephemeral values: the `with_*` builders consume the
/// path and return an extended copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributePath {
    steps: Vec<AttributePathStep>,
}

impl AttributePath {
    /// Creates an empty path pointing at the root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a path from existing steps.
    #[must_use]
    pub fn from_steps(steps: Vec<AttributePathStep>) -> Self {
        Self { steps }
    }

    /// Shorthand for a single-step path selecting a top-level attribute.
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self::new().with_attribute_name(name)
    }

    #[must_use]
    pub fn with_step(mut self, step: AttributePathStep) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn with_attribute_name(self, name: impl Into<String>) -> Self {
        self.with_step(AttributePathStep::AttributeName(name.into()))
    }

    #[must_use]
    pub fn with_element_key_string(self, key: impl Into<String>) -> Self {
        self.with_step(AttributePathStep::ElementKeyString(key.into()))
    }

    #[must_use]
    pub fn with_element_key_int(self, index: i64) -> Self {
        self.with_step(AttributePathStep::ElementKeyInt(index))
    }

    #[must_use]
    pub fn with_element_key_value(self, value: Value) -> Self {
        self.with_step(AttributePathStep::ElementKeyValue(value))
    }

    pub fn steps(&self) -> &[AttributePathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_step(&self) -> Option<&AttributePathStep> {
        self.steps.last()
    }

    /// Returns the path with its final step removed.
    #[must_use]
    pub fn parent(&self) -> Self {
        let mut steps = self.steps.clone();
        steps.pop();
        Self { steps }
    }

    /// Looks up the value this path addresses inside a configuration
    /// document. Returns `None` when any step has nothing to select.
    pub fn value_in<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.steps.iter().try_fold(root, |current, step| match step {
            AttributePathStep::AttributeName(name) | AttributePathStep::ElementKeyString(name) => {
                current.as_object()?.get(name)
            }
            AttributePathStep::ElementKeyInt(index) => {
                let index = usize::try_from(*index).ok()?;
                current.as_array()?.get(index)
            }
            AttributePathStep::ElementKeyValue(wanted) => {
                current.as_array()?.iter().find(|element| *element == wanted)
            }
        })
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl From<Vec<AttributePathStep>> for AttributePath {
    fn from(steps: Vec<AttributePathStep>) -> Self {
        Self::from_steps(steps)
    }
}
