use crate::validate::AttributeValidator;
use plugframe_types::{AttrType, ObjectType, WireType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One named entry in a schema.
///
/// Construction never validates anything: flag combinations and names are
/// checked by the consumers (wire serialization, validation) so partially
/// built attributes can exist while a schema is being assembled.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub kind: AttributeKind,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Values are redacted by the host in plan output.
    pub sensitive: bool,
    pub description: String,
    /// Takes precedence over `description` for formatted rendering.
    pub markdown_description: String,
    /// A non-empty message marks the attribute deprecated.
    pub deprecation_message: String,
    /// Plugin-supplied checks run against the configured value.
    pub validators: Vec<Arc<dyn AttributeValidator>>,
}

/// Whether an attribute is a leaf or a branch.
#[derive(Debug, Clone)]
pub enum AttributeKind {
    /// A leaf with a concrete value type.
    Type(AttrType),
    /// A branch holding its own attributes.
    Nested(NestedAttributes),
}

impl Attribute {
    fn with_kind(kind: AttributeKind) -> Self {
        Self {
            kind,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            description: String::new(),
            markdown_description: String::new(),
            deprecation_message: String::new(),
            validators: Vec::new(),
        }
    }

    /// A leaf attribute of the given type, with no flags set.
    pub fn new(ty: AttrType) -> Self {
        Self::with_kind(AttributeKind::Type(ty))
    }

    /// A branch attribute, with no flags set.
    pub fn nested(nested: NestedAttributes) -> Self {
        Self::with_kind(AttributeKind::Nested(nested))
    }

    /// Shorthand for a required string.
    pub fn required_string() -> Self {
        Self::new(AttrType::String).required()
    }

    /// Shorthand for an optional string.
    pub fn optional_string() -> Self {
        Self::new(AttrType::String).optional()
    }

    /// Shorthand for a string only the provider sets.
    pub fn computed_string() -> Self {
        Self::new(AttrType::String).computed()
    }

    /// Shorthand for a required number.
    pub fn required_number() -> Self {
        Self::new(AttrType::Number).required()
    }

    /// Shorthand for an optional bool.
    pub fn optional_bool() -> Self {
        Self::new(AttrType::Bool).optional()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_markdown_description(mut self, description: impl Into<String>) -> Self {
        self.markdown_description = description.into();
        self
    }

    pub fn with_deprecation_message(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = message.into();
        self
    }

    pub fn with_validator(mut self, validator: impl AttributeValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// The leaf type, or the derived type of the nested attributes.
    pub fn attribute_type(&self) -> AttrType {
        match &self.kind {
            AttributeKind::Type(ty) => ty.clone(),
            AttributeKind::Nested(nested) => nested.attribute_type(),
        }
    }

    /// Wire-level type of this attribute's values.
    pub fn terraform_type(&self) -> WireType {
        match &self.kind {
            AttributeKind::Type(ty) => ty.terraform_type(),
            AttributeKind::Nested(nested) => nested.attribute_type().terraform_type(),
        }
    }
}

impl fmt::Debug for dyn AttributeValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttributeValidator")
            .field(&self.description())
            .finish()
    }
}

/// How a branch's attributes repeat inside the parent value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    /// Exactly one object.
    #[default]
    Single,
    /// An ordered list of objects.
    List,
    /// An unordered set of objects.
    Set,
    /// Objects keyed by string.
    Map,
}

impl fmt::Display for NestingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Single => "single",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// A branch: child attributes plus the way they repeat.
#[derive(Debug, Clone, Default)]
pub struct NestedAttributes {
    pub nesting: NestingMode,
    pub attributes: Attributes,
}

impl NestedAttributes {
    pub fn single(attributes: Attributes) -> Self {
        Self {
            nesting: NestingMode::Single,
            attributes,
        }
    }

    pub fn list(attributes: Attributes) -> Self {
        Self {
            nesting: NestingMode::List,
            attributes,
        }
    }

    pub fn set(attributes: Attributes) -> Self {
        Self {
            nesting: NestingMode::Set,
            attributes,
        }
    }

    pub fn map(attributes: Attributes) -> Self {
        Self {
            nesting: NestingMode::Map,
            attributes,
        }
    }

    /// The children's object type, wrapped in the collection the nesting
    /// mode calls for.
    pub fn attribute_type(&self) -> AttrType {
        let object = AttrType::Object(self.attributes.object_type());
        match self.nesting {
            NestingMode::Single => object,
            NestingMode::List => AttrType::list(object),
            NestingMode::Set => AttrType::set(object),
            NestingMode::Map => AttrType::map(object),
        }
    }
}

/// Name-keyed attribute mapping.
///
/// Lookups go through the `HashMap`; a sorted copy of the keys is kept next
/// to it so every iteration is in name order.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    map: HashMap<String, Attribute>,
    names: Vec<String>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.insert(name, attribute);
        self
    }

    /// Inserts or replaces an attribute, returning the previous definition.
    pub fn insert(&mut self, name: impl Into<String>, attribute: Attribute) -> Option<Attribute> {
        let name = name.into();
        if let Err(pos) = self.names.binary_search(&name) {
            self.names.insert(pos, name.clone());
        }
        self.map.insert(name, attribute)
    }

    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        let removed = self.map.remove(name)?;
        self.names.retain(|n| n != name);
        Some(removed)
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Attribute names in sorted order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterates in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.names
            .iter()
            .filter_map(|name| self.map.get(name).map(|attr| (name.as_str(), attr)))
    }

    /// Object type with one field per attribute.
    pub fn object_type(&self) -> ObjectType {
        self.iter()
            .map(|(name, attr)| (name.to_owned(), attr.attribute_type()))
            .collect()
    }
}

impl FromIterator<(String, Attribute)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, Attribute)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, attribute) in iter {
            attributes.insert(name, attribute);
        }
        attributes
    }
}
