use std::any::Any;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A derivation panicked or returned an error while the queue was drained.
    /// `applied` updates of that cycle stay committed, `dropped` ones (the
    /// failing update included) are discarded.
    #[error(
        "derivation failed in component '{component}': {message} \
         ({applied} applied, {dropped} dropped)"
    )]
    DerivationFailed {
        component: String,
        message: String,
        applied: usize,
        dropped: usize,
    },

    #[error("state of component '{component}' used after it was destroyed")]
    UseAfterDestroy { component: String },

    #[error("render loop: updates still queued after {limit} nested cycles")]
    RenderLoop { limit: usize },
}

impl StateError {
    pub fn component(&self) -> Option<&str> {
        match self {
            StateError::DerivationFailed { component, .. }
            | StateError::UseAfterDestroy { component } => Some(component),
            StateError::RenderLoop { .. } => None,
        }
    }
}

/// Extracts a readable message from a `catch_unwind` payload.
pub(crate) fn panic_message(err: Box<dyn Any + Send>) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
