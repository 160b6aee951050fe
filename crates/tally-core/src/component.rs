use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::cell::{PendingUpdates, StateCell};
use crate::error::StateError;
use crate::scheduler::{self, CycleReport};
use crate::scope::Scope;

new_key_type! {
    /// Registry key of a live component.
    pub struct ComponentId;
}

thread_local! {
    static CURRENT_COMPONENT: RefCell<Option<Weak<ComponentInner>>> = const { RefCell::new(None) };
}

/// The owner of some state cells.
///
/// A component is notified through its render callback once per cycle in
/// which any of its cells changed. Cloning gives another handle to the same
/// instance; cells only hold a weak reference back, so dropping every handle
/// destroys the state with it.
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

pub(crate) struct ComponentInner {
    id: ComponentId,
    name: String,
    alive: Cell<bool>,
    scheduled: Cell<bool>,
    scope: Scope,
    // order-based `remember_state` slots
    slots: RefCell<Vec<Box<dyn Any>>>,
    cursor: Cell<usize>,
    // cells with queued updates, in the order they were first touched
    dirty: RefCell<SmallVec<[Rc<dyn PendingUpdates>; 4]>>,
    on_render: RefCell<Option<Rc<dyn Fn()>>>,
    on_error: RefCell<Option<Rc<dyn Fn(&StateError)>>>,
    render_count: Cell<u64>,
}

/// Restores the previous current component, even if the closure unwinds.
struct ContextGuard {
    prev: Option<Weak<ComponentInner>>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let prev = self.prev.take();
        CURRENT_COMPONENT.with(|c| *c.borrow_mut() = prev);
    }
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let inner = Rc::new_cyclic(|weak| ComponentInner {
            id: scheduler::register(weak.clone()),
            name,
            alive: Cell::new(true),
            scheduled: Cell::new(false),
            scope: Scope::new(),
            slots: RefCell::new(Vec::new()),
            cursor: Cell::new(0),
            dirty: RefCell::new(SmallVec::new()),
            on_render: RefCell::new(None),
            on_error: RefCell::new(None),
            render_count: Cell::new(0),
        });
        log::debug!("created component '{}' ({:?})", inner.name, inner.id);
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Rc<ComponentInner>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> ComponentId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    pub fn render_count(&self) -> u64 {
        self.inner.render_count.get()
    }

    /// True while any owned cell has updates waiting for a cycle.
    pub fn has_pending(&self) -> bool {
        !self.inner.dirty.borrow().is_empty()
    }

    /// Installs the re-render notification, replacing any previous one.
    pub fn on_render(&self, f: impl Fn() + 'static) {
        *self.inner.on_render.borrow_mut() = Some(Rc::new(f));
    }

    /// Installs the error boundary. Without one, failures are logged.
    pub fn on_error(&self, f: impl Fn(&StateError) + 'static) {
        *self.inner.on_error.borrow_mut() = Some(Rc::new(f));
    }

    pub fn on_destroy(&self, f: impl FnOnce() + 'static) {
        self.inner.scope.add_disposer(f);
    }

    /// Creates a cell owned by this component.
    pub fn state<T: 'static>(&self, initial: T) -> StateCell<T> {
        if !self.is_alive() {
            log::warn!(
                "state created on destroyed component '{}'; every use will fail",
                self.inner.name
            );
        }
        StateCell::new_owned(&self.inner, initial)
    }

    /// Order-based state slot: the Nth call during a render returns the Nth
    /// cell, creating it with `init` the first time.
    pub fn remember_state<T: 'static>(&self, init: impl FnOnce() -> T) -> StateCell<T> {
        let cursor = self.inner.cursor.get();
        self.inner.cursor.set(cursor + 1);

        let existing = self
            .inner
            .slots
            .borrow()
            .get(cursor)
            .map(|slot| slot.downcast_ref::<StateCell<T>>().cloned());
        match existing {
            Some(Some(cell)) => cell,
            Some(None) => {
                log::warn!(
                    "remember_state: slot {} of '{}' changed type; replacing.",
                    cursor,
                    self.inner.name
                );
                let cell = self.state(init());
                self.inner.slots.borrow_mut()[cursor] = Box::new(cell.clone());
                cell
            }
            None => {
                let cell = self.state(init());
                self.inner.slots.borrow_mut().push(Box::new(cell.clone()));
                cell
            }
        }
    }

    /// Runs `f` with this component as the current one.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        self.inner.enter(f)
    }

    /// Calls the render callback now, outside of any cycle.
    pub fn render(&self) {
        self.inner.render();
    }

    /// Discards every pending update without notifying, runs the
    /// `on_destroy` disposers and unregisters. Calling it twice is a no-op.
    pub fn destroy(&self) {
        self.inner.destroy();
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("alive", &self.inner.alive.get())
            .field("render_count", &self.inner.render_count.get())
            .finish()
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ComponentInner {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.get()
    }

    pub(crate) fn mark_dirty(&self, cell: Rc<dyn PendingUpdates>) {
        self.dirty.borrow_mut().push(cell);
    }

    /// Returns true the first time it is called after the last cycle.
    pub(crate) fn mark_scheduled(&self) -> bool {
        !self.scheduled.replace(true)
    }

    fn enter<R>(self: &Rc<Self>, f: impl FnOnce() -> R) -> R {
        let prev = CURRENT_COMPONENT.with(|c| c.replace(Some(Rc::downgrade(self))));
        let _guard = ContextGuard { prev };
        f()
    }

    fn render(self: &Rc<Self>) {
        if !self.alive.get() {
            log::warn!("render of destroyed component '{}' ignored", self.name);
            return;
        }
        self.cursor.set(0);
        self.render_count.set(self.render_count.get() + 1);
        let on_render = self.on_render.borrow().clone();
        if let Some(on_render) = on_render {
            self.enter(|| on_render());
        }
    }

    fn report_error(&self, err: &StateError) {
        let on_error = self.on_error.borrow().clone();
        match on_error {
            Some(on_error) => on_error(err),
            None => log::error!("{err}"),
        }
    }

    /// One cycle for this component: stage every dirty cell, drain them in
    /// order, then notify once if anything was committed.
    pub(crate) fn run_cycle(self: &Rc<Self>, report: &mut CycleReport) {
        self.scheduled.set(false);
        if !self.alive.get() {
            return;
        }

        let dirty = std::mem::take(&mut *self.dirty.borrow_mut());
        for cell in &dirty {
            cell.stage();
        }

        let mut applied = 0;
        let mut failure = None;
        let mut cells = dirty.into_iter();
        while let Some(cell) = cells.next() {
            if !self.alive.get() {
                // destroyed from inside a derivation
                cell.discard_all();
                cells.by_ref().for_each(|c| {
                    c.discard_all();
                });
                break;
            }
            match cell.drain() {
                Ok(n) => applied += n,
                Err(f) => {
                    applied += f.applied;
                    let dropped =
                        f.dropped + cells.by_ref().map(|c| c.discard_staged()).sum::<usize>();
                    report.dropped += dropped;
                    failure = Some(StateError::DerivationFailed {
                        component: self.name.clone(),
                        message: f.message,
                        applied,
                        dropped,
                    });
                    break;
                }
            }
        }
        report.applied += applied;

        if let Some(err) = failure {
            report.failures += 1;
            self.report_error(&err);
        }
        if applied > 0 && self.alive.get() {
            self.render();
            report.rendered += 1;
        }
    }

    /// Drops everything still queued; used when a flush gives up.
    pub(crate) fn discard_pending(&self) -> usize {
        self.scheduled.set(false);
        let dirty = std::mem::take(&mut *self.dirty.borrow_mut());
        dirty.iter().map(|c| c.discard_all()).sum()
    }

    fn destroy(&self) {
        if !self.alive.replace(false) {
            return;
        }
        let discarded = self.discard_pending();
        self.scope.dispose();
        let slots = std::mem::take(&mut *self.slots.borrow_mut());
        drop(slots);
        scheduler::unregister(self.id);
        log::debug!(
            "destroyed component '{}' ({} pending updates discarded)",
            self.name,
            discarded
        );
    }
}

impl Drop for ComponentInner {
    fn drop(&mut self) {
        if self.alive.get() {
            scheduler::unregister(self.id);
        }
    }
}

/// The component whose render or `run` closure is executing.
pub fn current_component() -> Option<Component> {
    CURRENT_COMPONENT.with(|c| {
        c.borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade())
            .map(Component::from_inner)
    })
}

/// [`Component::remember_state`] on the current component.
///
/// Panics when called outside a render.
pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> StateCell<T> {
    match current_component() {
        Some(component) => component.remember_state(init),
        None => panic!("remember_state called outside of a component render"),
    }
}
