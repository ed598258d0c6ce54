use crate::{AttributePathStep, AttributePathStepper, StepError, WireType};
use std::collections::BTreeMap;
use std::fmt;

/// The value type of a leaf attribute.
///
/// Collection and object types nest arbitrarily. Path steps applied to a
/// type descend into its elements or fields; see [`AttrType::apply_step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrType {
    String,
    Number,
    Bool,
    List(Box<AttrType>),
    Set(Box<AttrType>),
    Map(Box<AttrType>),
    Object(ObjectType),
}

impl AttrType {
    pub fn list(element: AttrType) -> Self {
        Self::List(Box::new(element))
    }

    pub fn set(element: AttrType) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn map(element: AttrType) -> Self {
        Self::Map(Box::new(element))
    }

    /// Element type of a list, set or map.
    pub fn element_type(&self) -> Option<&AttrType> {
        match self {
            Self::List(elem) | Self::Set(elem) | Self::Map(elem) => Some(elem),
            _ => None,
        }
    }

    /// Converts to the protocol-level type encoding.
    pub fn terraform_type(&self) -> WireType {
        match self {
            Self::String => WireType::String,
            Self::Number => WireType::Number,
            Self::Bool => WireType::Bool,
            Self::List(elem) => WireType::List(Box::new(elem.terraform_type())),
            Self::Set(elem) => WireType::Set(Box::new(elem.terraform_type())),
            Self::Map(elem) => WireType::Map(Box::new(elem.terraform_type())),
            Self::Object(obj) => obj.terraform_type(),
        }
    }
}

impl AttributePathStepper for AttrType {
    /// Lists take integer indexes, sets take element values, maps take
    /// string keys and objects take attribute names. Primitives accept
    /// nothing.
    fn apply_step(&self, step: &AttributePathStep) -> Result<Self, StepError> {
        match (self, step) {
            (Self::List(elem), AttributePathStep::ElementKeyInt(_))
            | (Self::Set(elem), AttributePathStep::ElementKeyValue(_))
            | (Self::Map(elem), AttributePathStep::ElementKeyString(_)) => Ok((**elem).clone()),
            (Self::Object(obj), AttributePathStep::AttributeName(name)) => obj
                .get(name)
                .cloned()
                .ok_or_else(|| StepError::AttributeNotFound {
                    name: name.clone(),
                    target: "object type".into(),
                }),
            _ => Err(StepError::cannot_apply(step, self.to_string())),
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("StringType"),
            Self::Number => f.write_str("NumberType"),
            Self::Bool => f.write_str("BoolType"),
            Self::List(elem) => write!(f, "ListType[{elem}]"),
            Self::Set(elem) => write!(f, "SetType[{elem}]"),
            Self::Map(elem) => write!(f, "MapType[{elem}]"),
            Self::Object(obj) => write!(f, "{obj}"),
        }
    }
}

impl From<ObjectType> for AttrType {
    fn from(obj: ObjectType) -> Self {
        Self::Object(obj)
    }
}

/// An object type: a fixed set of named, typed fields.
///
/// Fields are kept in a `BTreeMap` so equality is structural and iteration
/// order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectType {
    attr_types: BTreeMap<String, AttrType>,
}

impl ObjectType {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, ty: AttrType) -> Self {
        self.insert(name, ty);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: AttrType) {
        self.attr_types.insert(name.into(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&AttrType> {
        self.attr_types.get(name)
    }

    pub fn len(&self) -> usize {
        self.attr_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attr_types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrType)> {
        self.attr_types.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn terraform_type(&self) -> WireType {
        WireType::Object(
            self.attr_types
                .iter()
                .map(|(name, ty)| (name.clone(), ty.terraform_type()))
                .collect(),
        )
    }
}

impl FromIterator<(String, AttrType)> for ObjectType {
    fn from_iter<I: IntoIterator<Item = (String, AttrType)>>(iter: I) -> Self {
        Self {
            attr_types: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ObjectType[")?;
        for (i, (name, ty)) in self.attr_types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name:?}:{ty}")?;
        }
        f.write_str("]")
    }
}
