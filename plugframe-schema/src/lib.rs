//! Schema model for plugframe plugins.
//!
//! A plugin declares the shape of a resource, data source, or provider
//! configuration as a [`Schema`]: a mapping of names to [`Attribute`]s, each
//! either a leaf with an [`AttrType`](plugframe_types::AttrType) or a branch
//! of [`NestedAttributes`]. From that one declaration this crate derives:
//! - the structural type ([`Schema::attribute_type`], [`Schema::terraform_type`])
//! - path lookups ([`Schema::attribute_at_path`], [`Schema::attribute_type_at_path`])
//! - the wire schema sent to the host ([`Schema::to_wire_schema`])
//! - configuration validation ([`Schema::validate`])
//!
//! Schemas are built once at startup and only read afterwards, so they are
//! `Send + Sync` and can be shared across concurrent requests.

mod attribute;
mod error;
mod path;
mod schema;
mod validate;
mod wire;

pub use attribute::{Attribute, AttributeKind, Attributes, NestedAttributes, NestingMode};
pub use error::{SchemaError, SchemaResult};
pub use path::PathTarget;
pub use schema::Schema;
pub use validate::{
    AttributeValidator, ValidateAttributeRequest, ValidateAttributeResponse,
    ValidateSchemaRequest, ValidateSchemaResponse,
};
pub use wire::{StringKind, WireAttribute, WireBlock, WireNestedType, WireSchema};
