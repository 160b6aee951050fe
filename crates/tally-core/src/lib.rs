//! # Component state and queued updates
//!
//! Tally keeps UI state inside the component that owns it. There are three
//! pieces:
//!
//! - `StateCell<T>`: one value owned by one component.
//! - `Component`: the owner, which is re-rendered when its cells change.
//! - `dispatch` / `flush`: the scheduling boundary where queued updates are
//!   applied and the owner re-renders.
//!
//! ## Requesting updates
//!
//! Writes never apply immediately. They are queued on the cell and applied
//! when the current event handler returns:
//!
//! ```rust
//! use tally_core::*;
//!
//! let counter = Component::new("counter");
//! let count = counter.state(0);
//!
//! dispatch(|| {
//!     count.set(count.get() + 1);
//!     assert_eq!(count.get(), 0); // still the value from before the handler
//! })
//! .unwrap();
//!
//! assert_eq!(count.get(), 1);
//! ```
//!
//! A plain value computed from a read replaces whatever is there, so two of
//! them in one handler collapse into one. A derivation is applied to the value
//! current when the queue is drained, so derivations compose:
//!
//! ```rust
//! use tally_core::*;
//!
//! let counter = Component::new("counter");
//! let count = counter.state(0);
//!
//! dispatch(|| {
//!     count.update(|n| n + 1);
//!     count.update(|n| n + 1);
//! })
//! .unwrap();
//!
//! assert_eq!(count.get(), 2);
//! ```
//!
//! ## Re-rendering
//!
//! However many updates a handler queues, the owning component is notified
//! once per cycle:
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tally_core::*;
//!
//! let renders = Rc::new(Cell::new(0));
//! let counter = Component::new("counter");
//! counter.on_render({
//!     let renders = renders.clone();
//!     move || renders.set(renders.get() + 1)
//! });
//! let count = counter.state(0);
//!
//! dispatch(|| {
//!     for _ in 0..10 {
//!         count.update(|n| n + 1);
//!     }
//! })
//! .unwrap();
//!
//! assert_eq!(renders.get(), 1);
//! ```
//!
//! ## Remembered state
//!
//! Inside a render callback, `remember_state` is order-based like the
//! framework's other `remember*` hooks: the Nth call returns the Nth cell of
//! the component being rendered, created on first use.

pub mod cell;
pub mod component;
pub mod config;
pub mod error;
pub mod prelude;
pub mod scheduler;
pub mod scope;
pub mod tests;
pub mod update;

pub use cell::*;
pub use component::*;
pub use config::*;
pub use error::*;
pub use scheduler::*;
pub use update::*;
