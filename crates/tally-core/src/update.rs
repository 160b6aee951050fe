use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::panic_message;

/// A replacement queued against a `StateCell`, consumed when applied.
pub enum UpdateRequest<T: 'static> {
    /// Becomes the new value as-is.
    Replace(T),
    /// Applied to the value current when the queue is drained.
    Derive(Box<dyn FnOnce(&T) -> T>),
    /// Like `Derive`, but may refuse with an error message.
    TryDerive(Box<dyn FnOnce(&T) -> Result<T, String>>),
}

impl<T: 'static> UpdateRequest<T> {
    pub fn value(v: T) -> Self {
        UpdateRequest::Replace(v)
    }

    pub fn derive(f: impl FnOnce(&T) -> T + 'static) -> Self {
        UpdateRequest::Derive(Box::new(f))
    }

    pub fn try_derive<E: fmt::Display>(
        f: impl FnOnce(&T) -> Result<T, E> + 'static,
    ) -> Self {
        UpdateRequest::TryDerive(Box::new(move |v| f(v).map_err(|e| e.to_string())))
    }

    pub fn is_derivation(&self) -> bool {
        !matches!(self, UpdateRequest::Replace(_))
    }

    /// Produces the next value from `current`. Panics inside a derivation are
    /// caught and turned into the error message.
    pub(crate) fn apply(self, current: &T) -> Result<T, String> {
        match self {
            UpdateRequest::Replace(v) => Ok(v),
            UpdateRequest::Derive(f) => {
                catch_unwind(AssertUnwindSafe(|| f(current))).map_err(panic_message)
            }
            UpdateRequest::TryDerive(f) => {
                catch_unwind(AssertUnwindSafe(|| f(current))).map_err(panic_message)?
            }
        }
    }
}

impl<T: 'static> From<T> for UpdateRequest<T> {
    fn from(v: T) -> Self {
        UpdateRequest::Replace(v)
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for UpdateRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateRequest::Replace(v) => f.debug_tuple("Replace").field(v).finish(),
            UpdateRequest::Derive(_) => f.write_str("Derive(<fn>)"),
            UpdateRequest::TryDerive(_) => f.write_str("TryDerive(<fn>)"),
        }
    }
}
