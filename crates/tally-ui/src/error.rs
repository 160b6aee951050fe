use tally_core::StateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("no button labelled '{0}' in the current view")]
    NoSuchButton(String),

    #[error("component was unmounted")]
    Unmounted,

    #[error(transparent)]
    State(#[from] StateError),
}
