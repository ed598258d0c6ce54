//! The path walking primitive.
//!
//! Anything that can absorb a single [`AttributePathStep`] implements
//! [`AttributePathStepper`]; [`walk_attribute_path`] then drives it across a
//! whole [`AttributePath`]. The stepper's own type is the terminal shape, so
//! callers match on a closed set of outcomes instead of probing an opaque
//! value.

use crate::{AttributePath, AttributePathStep, StepError};

/// A value that can be traversed one path step at a time.
pub trait AttributePathStepper: Sized {
    /// Applies one step, returning what the step arrives at.
    fn apply_step(&self, step: &AttributePathStep) -> Result<Self, StepError>;
}

/// A walk that stopped before consuming the whole path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{remaining} still remains in the path: {source}")]
pub struct WalkError {
    /// The unconsumed steps, starting with the one that failed.
    pub remaining: AttributePath,
    #[source]
    pub source: StepError,
}

/// Applies every step of `path` to `root` in order.
///
/// On failure the error carries the remaining path, beginning at the step
/// that could not be applied.
pub fn walk_attribute_path<T: AttributePathStepper>(
    root: T,
    path: &AttributePath,
) -> Result<T, WalkError> {
    let mut current = root;
    for (i, step) in path.steps().iter().enumerate() {
        current = current.apply_step(step).map_err(|source| WalkError {
            remaining: AttributePath::from_steps(path.steps()[i..].to_vec()),
            source,
        })?;
    }
    Ok(current)
}
