use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::component::{Component, ComponentInner};
use crate::error::StateError;
use crate::scheduler;
use crate::update::UpdateRequest;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CellPhase {
    #[default]
    Idle,
    Queued,
    Applying,
}

/// One value owned by one component.
///
/// Writes are queued and applied at the next scheduling boundary; reads
/// always see the value as of the last applied update. Cloning a cell gives
/// another handle to the same value.
pub struct StateCell<T: 'static> {
    inner: Rc<CellInner<T>>,
}

impl<T: 'static> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub(crate) struct CellInner<T: 'static> {
    value: RefCell<T>,
    version: Cell<u64>,
    phase: Cell<CellPhase>,
    // requested since the last cycle started
    queue: RefCell<VecDeque<UpdateRequest<T>>>,
    // moved out of `queue` when a cycle starts; drained by that cycle only
    staged: RefCell<VecDeque<UpdateRequest<T>>>,
    owner: Weak<ComponentInner>,
    component: String,
}

/// A failed drain: `applied` updates were committed before the failure,
/// `dropped` counts the failing update and the ones staged after it.
pub(crate) struct DrainFailure {
    pub message: String,
    pub applied: usize,
    pub dropped: usize,
}

/// Type-erased view of a cell's queue, so a component can drive cells of
/// different value types through one cycle.
pub(crate) trait PendingUpdates {
    /// Moves everything queued so far into the batch for the running cycle.
    fn stage(&self);
    /// Applies the staged batch in FIFO order.
    fn drain(&self) -> Result<usize, DrainFailure>;
    /// Drops the staged batch. Returns how many updates were dropped.
    fn discard_staged(&self) -> usize;
    /// Drops the staged batch and everything still queued.
    fn discard_all(&self) -> usize;
}

impl<T: 'static> StateCell<T> {
    pub(crate) fn new_owned(owner: &Rc<ComponentInner>, initial: T) -> Self {
        Self {
            inner: Rc::new(CellInner {
                value: RefCell::new(initial),
                version: Cell::new(0),
                phase: Cell::new(CellPhase::Idle),
                queue: RefCell::new(VecDeque::new()),
                staged: RefCell::new(VecDeque::new()),
                owner: Rc::downgrade(owner),
                component: owner.name().to_string(),
            }),
        }
    }

    fn live_owner(&self) -> Result<Rc<ComponentInner>, StateError> {
        match self.inner.owner.upgrade() {
            Some(owner) if owner.is_alive() => Ok(owner),
            _ => Err(StateError::UseAfterDestroy {
                component: self.inner.component.clone(),
            }),
        }
    }

    /// Value as of the last applied update.
    ///
    /// Panics if the owning component has been destroyed.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.try_get().unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_get(&self) -> Result<T, StateError>
    where
        T: Clone,
    {
        self.live_owner()?;
        Ok(self.inner.value.borrow().clone())
    }

    /// Reads the value without cloning it.
    ///
    /// The value stays borrowed while `f` runs, so `f` counts as a handler:
    /// a `flush` or `dispatch` inside it is deferred to the enclosing boundary.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        if let Err(e) = self.live_owner() {
            panic!("{e}");
        }
        scheduler::hold(|| f(&self.inner.value.borrow()))
    }

    /// Queues a replacement. Nothing changes until the scheduling boundary.
    ///
    /// Panics if the owning component has been destroyed.
    pub fn request_update(&self, next: impl Into<UpdateRequest<T>>) {
        if let Err(e) = self.try_request_update(next) {
            panic!("{e}");
        }
    }

    pub fn try_request_update(&self, next: impl Into<UpdateRequest<T>>) -> Result<(), StateError> {
        let owner = self.live_owner()?;
        let next = next.into();
        log::trace!(
            "queue {} update on '{}'",
            if next.is_derivation() { "derived" } else { "plain" },
            self.inner.component
        );

        let first = {
            let mut queue = self.inner.queue.borrow_mut();
            queue.push_back(next);
            queue.len() == 1
        };
        if self.inner.phase.get() == CellPhase::Idle {
            self.inner.phase.set(CellPhase::Queued);
        }
        if first {
            owner.mark_dirty(self.inner.clone());
        }
        scheduler::schedule(&owner);
        Ok(())
    }

    /// Queues `value` as the next value.
    pub fn set(&self, value: T) {
        self.request_update(UpdateRequest::Replace(value));
    }

    /// Queues `f`, applied to whatever value is current when it runs.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.request_update(UpdateRequest::derive(f));
    }

    /// Queues a derivation that may fail; a failure aborts the rest of the
    /// owner's cycle and reaches its error boundary.
    pub fn try_update<E: fmt::Display>(&self, f: impl FnOnce(&T) -> Result<T, E> + 'static) {
        self.request_update(UpdateRequest::try_derive(f));
    }

    /// Bumped once for every applied update.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    pub fn phase(&self) -> CellPhase {
        self.inner.phase.get()
    }

    /// Updates requested but not applied yet.
    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len() + self.inner.staged.borrow().len()
    }

    pub fn owner(&self) -> Option<Component> {
        self.inner.owner.upgrade().map(Component::from_inner)
    }
}

impl<T: 'static> CellInner<T> {
    fn owner_alive(&self) -> bool {
        self.owner.upgrade().is_some_and(|o| o.is_alive())
    }

    fn settle(&self) {
        let phase = if self.queue.borrow().is_empty() {
            CellPhase::Idle
        } else {
            CellPhase::Queued
        };
        self.phase.set(phase);
    }
}

impl<T: 'static> PendingUpdates for CellInner<T> {
    fn stage(&self) {
        let mut queue = self.queue.borrow_mut();
        self.staged.borrow_mut().extend(queue.drain(..));
    }

    fn drain(&self) -> Result<usize, DrainFailure> {
        let batch = std::mem::take(&mut *self.staged.borrow_mut());
        self.phase.set(CellPhase::Applying);

        let mut applied = 0;
        let mut batch = batch.into_iter();
        while let Some(request) = batch.next() {
            let next = {
                let current = self.value.borrow();
                request.apply(&current)
            };
            if !self.owner_alive() {
                // destroyed by a derivation: this result and the rest go
                let dropped = 1 + batch.len();
                self.queue.borrow_mut().clear();
                self.phase.set(CellPhase::Idle);
                log::debug!(
                    "'{}' destroyed mid-drain; {} updates discarded",
                    self.component,
                    dropped
                );
                return Ok(applied);
            }
            match next {
                Ok(v) => {
                    *self.value.borrow_mut() = v;
                    self.version.set(self.version.get() + 1);
                    applied += 1;
                    log::trace!(
                        "applied update on '{}' (version {})",
                        self.component,
                        self.version.get()
                    );
                }
                Err(message) => {
                    let dropped = 1 + batch.len();
                    self.settle();
                    return Err(DrainFailure {
                        message,
                        applied,
                        dropped,
                    });
                }
            }
        }

        self.settle();
        Ok(applied)
    }

    fn discard_staged(&self) -> usize {
        let dropped = std::mem::take(&mut *self.staged.borrow_mut()).len();
        self.settle();
        dropped
    }

    fn discard_all(&self) -> usize {
        let staged = std::mem::take(&mut *self.staged.borrow_mut()).len();
        let queued = std::mem::take(&mut *self.queue.borrow_mut()).len();
        self.phase.set(CellPhase::Idle);
        staged + queued
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .field("phase", &self.inner.phase.get())
            .field("component", &self.inner.component)
            .finish()
    }
}
