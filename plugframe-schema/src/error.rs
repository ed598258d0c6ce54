//! Error types for schema operations.

use plugframe_types::{AttributePath, WalkError};
use thiserror::Error;

/// Hard errors raised while interpreting a schema.
///
/// These indicate a malformed path or a plugin-authoring bug; user-facing
/// configuration problems are reported as diagnostics instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// The path could not be walked to its end.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// The path is structurally valid but ends inside a leaf attribute's
    /// value, where no attribute definition exists.
    #[error(
        "path leads to element or attribute of a schema.Attribute that has no \
         schema associated with it"
    )]
    PathInsideAtomicAttribute,

    /// The path ended on something that is not the requested kind.
    #[error("got unexpected type {found} at path {path}")]
    UnexpectedType {
        path: AttributePath,
        found: &'static str,
    },

    #[error("must have at least one attribute in the schema")]
    EmptySchema,

    #[error("nested attribute {path} must have at least one attribute")]
    EmptyNestedAttributes { path: AttributePath },

    #[error(
        "attribute name {name:?} at {path} must only contain lowercase letters, \
         numbers, and underscores"
    )]
    InvalidAttributeName { name: String, path: AttributePath },

    #[error("attribute {path} {reason}")]
    InvalidAttributeFlags {
        path: AttributePath,
        reason: &'static str,
    },
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
