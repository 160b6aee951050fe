use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use slotmap::SlotMap;
use web_time::{Duration, Instant};

use crate::component::{ComponentId, ComponentInner};
use crate::config::SchedulerConfig;
use crate::error::StateError;

thread_local! {
    static SCHEDULER: RefCell<SchedulerState> = RefCell::new(SchedulerState::default());
}

#[derive(Default)]
struct SchedulerState {
    registry: SlotMap<ComponentId, Weak<ComponentInner>>,
    // components with queued updates, in the order they were first scheduled
    pending: VecDeque<Weak<ComponentInner>>,
    depth: usize,
    flushing: bool,
    config: SchedulerConfig,
}

/// What one flush did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycles: usize,
    pub rendered: usize,
    pub applied: usize,
    pub dropped: usize,
    pub failures: usize,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn is_empty(&self) -> bool {
        self.cycles == 0
    }
}

pub(crate) fn register(component: Weak<ComponentInner>) -> ComponentId {
    SCHEDULER.with(|s| s.borrow_mut().registry.insert(component))
}

pub(crate) fn unregister(id: ComponentId) {
    // May run from a Drop during thread teardown.
    let _ = SCHEDULER.try_with(|s| {
        if let Ok(mut s) = s.try_borrow_mut() {
            s.registry.remove(id);
        }
    });
}

pub(crate) fn schedule(component: &Rc<ComponentInner>) {
    if component.mark_scheduled() {
        SCHEDULER.with(|s| s.borrow_mut().pending.push_back(Rc::downgrade(component)));
    }
}

pub fn configure(config: SchedulerConfig) {
    SCHEDULER.with(|s| s.borrow_mut().config = config);
}

pub fn config() -> SchedulerConfig {
    SCHEDULER.with(|s| s.borrow().config.clone())
}

/// Live components on this thread.
pub fn component_count() -> usize {
    SCHEDULER.with(|s| {
        s.borrow()
            .registry
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    })
}

pub fn has_pending() -> bool {
    SCHEDULER.with(|s| !s.borrow().pending.is_empty())
}

struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Self {
        SCHEDULER.with(|s| s.borrow_mut().depth += 1);
        DispatchGuard
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        SCHEDULER.with(|s| s.borrow_mut().depth -= 1);
    }
}

/// Runs `f` as if it were a handler: flushes requested inside it are
/// deferred to the enclosing boundary.
pub(crate) fn hold<R>(f: impl FnOnce() -> R) -> R {
    let _guard = DispatchGuard::enter();
    f()
}

/// Runs an event handler. Updates it requests are applied, and their owners
/// re-rendered, once the outermost `dispatch` returns.
pub fn dispatch<R>(handler: impl FnOnce() -> R) -> Result<R, StateError> {
    let result = {
        let _guard = DispatchGuard::enter();
        handler()
    };
    let outermost = SCHEDULER.with(|s| {
        let s = s.borrow();
        s.depth == 0 && !s.flushing
    });
    if outermost {
        flush()?;
    }
    Ok(result)
}

struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        SCHEDULER.with(|s| s.borrow_mut().flushing = false);
    }
}

/// Applies every queued update and notifies each affected component once.
///
/// Updates queued by render callbacks run in a following cycle of the same
/// flush. Calling `flush` from inside a flush, or from inside a `dispatch`
/// handler, is a no-op; the running flush or the outermost `dispatch` picks
/// the work up.
pub fn flush() -> Result<CycleReport, StateError> {
    let (config, deferred) = SCHEDULER.with(|s| {
        let mut s = s.borrow_mut();
        // inside a handler, or already flushing: the outer boundary drains
        let deferred = s.flushing || s.depth > 0;
        if !deferred {
            s.flushing = true;
        }
        (s.config.clone(), deferred)
    });
    if deferred {
        return Ok(CycleReport::default());
    }
    let _guard = FlushGuard;

    let started = Instant::now();
    let mut report = CycleReport::default();
    loop {
        let batch: Vec<Rc<ComponentInner>> = SCHEDULER.with(|s| {
            s.borrow_mut()
                .pending
                .drain(..)
                .filter_map(|w| w.upgrade())
                .collect()
        });
        if batch.is_empty() {
            break;
        }
        if report.cycles >= config.max_nested_cycles {
            let discarded: usize = batch.iter().map(|c| c.discard_pending()).sum();
            log::error!(
                "giving up after {} cycles; {} queued updates discarded",
                report.cycles,
                discarded
            );
            return Err(StateError::RenderLoop {
                limit: config.max_nested_cycles,
            });
        }

        report.cycles += 1;
        for component in &batch {
            component.run_cycle(&mut report);
        }
    }
    report.elapsed = started.elapsed();

    if config.log_cycles && !report.is_empty() {
        log::debug!(
            "flush: {} cycle(s), {} applied, {} dropped, {} rendered in {:?}",
            report.cycles,
            report.applied,
            report.dropped,
            report.rendered,
            report.elapsed
        );
    }
    Ok(report)
}
