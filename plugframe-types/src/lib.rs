//! Core type definitions for plugframe.
//!
//! This crate defines the plugin-agnostic building blocks that the schema
//! and server crates are written against:
//! - [`AttrType`] / [`ObjectType`]: the value type system attributes declare
//! - [`WireType`]: the protocol-level type encoding sent to the host
//! - [`AttributePath`]: structural paths into schemas and values
//! - [`walk_attribute_path`]: the step-by-step path walking primitive
//! - [`Diagnostics`]: append-only, user-facing diagnostics

mod attr_type;
mod diag;
mod path;
mod walk;
mod wire;

pub use attr_type::{AttrType, ObjectType};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use path::{AttributePath, AttributePathStep};
pub use walk::{AttributePathStepper, WalkError, walk_attribute_path};
pub use wire::WireType;

/// Errors raised when a single path step cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("could not find attribute {name:?} in {target}")]
    AttributeNotFound { name: String, target: String },

    #[error("cannot apply AttributePathStep {step} to {target}")]
    CannotApply { step: String, target: String },
}

impl StepError {
    pub(crate) fn cannot_apply(step: &AttributePathStep, target: impl Into<String>) -> Self {
        Self::CannotApply {
            step: step.to_string(),
            target: target.into(),
        }
    }
}
