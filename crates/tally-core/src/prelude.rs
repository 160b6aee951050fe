pub use crate::cell::{CellPhase, StateCell};
pub use crate::component::{Component, ComponentId, current_component, remember_state};
pub use crate::config::SchedulerConfig;
pub use crate::error::StateError;
pub use crate::scheduler::{CycleReport, configure, dispatch, flush};
pub use crate::scope::Scope;
pub use crate::update::UpdateRequest;
