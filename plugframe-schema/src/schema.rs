use crate::attribute::{Attribute, Attributes};
use crate::error::{SchemaError, SchemaResult};
use crate::path::PathTarget;
use crate::validate::{
    ValidateAttributeRequest, ValidateAttributeResponse, ValidateSchemaRequest,
    ValidateSchemaResponse,
};
use crate::wire::{WireBlock, WireSchema, description_fields, sort_by_name};
use plugframe_types::{AttrType, AttributePath, ObjectType, WireType, walk_attribute_path};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Describes the shape of a resource, data source, or provider
/// configuration.
///
/// An empty schema is a valid value; it only fails once it is serialized
/// with [`Schema::to_wire_schema`].
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Attribute names must only contain lowercase letters, numbers and
    /// underscores.
    pub attributes: Attributes,
    /// Bumped by one per release when stored state needs upgrading.
    pub version: i64,
    pub description: String,
    pub markdown_description: String,
    pub deprecation_message: String,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_markdown_description(mut self, description: impl Into<String>) -> Self {
        self.markdown_description = description.into();
        self
    }

    #[must_use]
    pub fn with_deprecation_message(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = message.into();
        self
    }

    /// Object type with one field per attribute: the leaf's type, or the
    /// derived type of a branch.
    pub fn attribute_type(&self) -> ObjectType {
        self.attributes.object_type()
    }

    /// Wire-level type that can represent values of this schema.
    pub fn terraform_type(&self) -> WireType {
        WireType::Object(
            self.attributes
                .iter()
                .map(|(name, attr)| (name.to_owned(), attr.terraform_type()))
                .collect(),
        )
    }

    /// Type of whatever `path` points at, whether an attribute or a
    /// position inside an attribute's value.
    pub fn attribute_type_at_path(&self, path: &AttributePath) -> SchemaResult<AttrType> {
        match walk_attribute_path(PathTarget::Schema(self), path)? {
            PathTarget::Type(ty) => Ok(ty),
            PathTarget::Attributes(attributes) => Ok(AttrType::Object(attributes.object_type())),
            PathTarget::Attribute(attribute) => Ok(attribute.attribute_type()),
            other @ PathTarget::Schema(_) => Err(SchemaError::UnexpectedType {
                path: path.clone(),
                found: other.kind(),
            }),
        }
    }

    /// The attribute `path` points at.
    ///
    /// Returns [`SchemaError::PathInsideAtomicAttribute`] when the path is
    /// valid but leads inside a leaf attribute's value, where there is no
    /// attribute definition to return.
    pub fn attribute_at_path(&self, path: &AttributePath) -> SchemaResult<&Attribute> {
        match walk_attribute_path(PathTarget::Schema(self), path)? {
            PathTarget::Attribute(attribute) => Ok(attribute),
            PathTarget::Type(_) => Err(SchemaError::PathInsideAtomicAttribute),
            other => Err(SchemaError::UnexpectedType {
                path: path.clone(),
                found: other.kind(),
            }),
        }
    }

    /// Serializes to the host's schema record.
    ///
    /// The first attribute that fails to convert aborts the whole
    /// conversion. Attributes are sorted by name. A schema without
    /// attributes is rejected after conversion, so a schema whose only
    /// attribute is broken reports that attribute's error.
    pub fn to_wire_schema(&self) -> SchemaResult<WireSchema> {
        let mut attributes = self
            .attributes
            .iter()
            .map(|(name, attr)| attr.to_wire_attribute(name, &AttributePath::root(name)))
            .collect::<SchemaResult<Vec<_>>>()?;

        sort_by_name(&mut attributes);

        if attributes.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let (description, description_kind) =
            description_fields(&self.description, &self.markdown_description);

        Ok(WireSchema {
            version: self.version,
            block: WireBlock {
                attributes,
                deprecated: !self.deprecation_message.is_empty(),
                description,
                description_kind,
            },
        })
    }

    /// Validates `req.config` against every attribute, then adds the
    /// schema's own deprecation warning.
    ///
    /// Every attribute is visited even after others report errors, and the
    /// deprecation warning is added regardless of them.
    pub fn validate(
        &self,
        ctx: &CancellationToken,
        req: &ValidateSchemaRequest,
        resp: &mut ValidateSchemaResponse,
    ) {
        for (name, attribute) in self.attributes.iter() {
            let attribute_req =
                ValidateAttributeRequest::new(AttributePath::root(name), &req.config);
            let mut attribute_resp = ValidateAttributeResponse::default();

            attribute.validate(ctx, &attribute_req, &mut attribute_resp);

            trace!(
                attribute = name,
                diagnostics = attribute_resp.diagnostics.len(),
                "Validated attribute"
            );
            resp.diagnostics.append(attribute_resp.diagnostics);
        }

        if !self.deprecation_message.is_empty() {
            resp.diagnostics
                .add_warning("Deprecated", self.deprecation_message.clone());
        }
    }
}
