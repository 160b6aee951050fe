#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::prelude::*;
    use crate::scheduler::{component_count, has_pending};

    fn counting(component: &Component) -> Rc<Cell<u32>> {
        let renders = Rc::new(Cell::new(0));
        component.on_render({
            let renders = renders.clone();
            move || renders.set(renders.get() + 1)
        });
        renders
    }

    #[test]
    fn test_get_after_create() {
        let c = Component::new("c");
        let cell = c.state(42);
        assert_eq!(cell.get(), 42);
        assert_eq!(cell.version(), 0);
        assert_eq!(cell.phase(), CellPhase::Idle);
    }

    #[test]
    fn test_plain_updates_last_write_wins() {
        let c = Component::new("c");
        let count = c.state(0);

        dispatch(|| {
            let seen = count.get();
            count.set(seen + 1);
            count.set(seen + 1);
        })
        .unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(count.version(), 2);
    }

    #[test]
    fn test_derivations_compose_fifo() {
        let c = Component::new("c");
        let count = c.state(0);

        dispatch(|| {
            count.update(|n| n + 1);
            count.update(|n| n + 1);
        })
        .unwrap();

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_mixed_requests_apply_in_order() {
        let c = Component::new("c");
        let cell = c.state(String::new());

        dispatch(|| {
            cell.update(|s| format!("{s}a"));
            cell.set("x".to_string());
            cell.update(|s| format!("{s}b"));
            cell.request_update(UpdateRequest::derive(|s: &String| format!("{s}c")));
        })
        .unwrap();

        assert_eq!(cell.get(), "xbc");
    }

    #[test]
    fn test_one_notification_per_cycle() {
        for queued in [1, 2, 10] {
            let c = Component::new("c");
            let renders = counting(&c);
            let count = c.state(0);

            dispatch(|| {
                for _ in 0..queued {
                    count.update(|n| n + 1);
                }
            })
            .unwrap();

            assert_eq!(renders.get(), 1, "{queued} updates");
            assert_eq!(count.get(), queued);
        }
    }

    #[test]
    fn test_one_notification_across_cells() {
        let c = Component::new("c");
        let renders = counting(&c);
        let a = c.state(0);
        let b = c.state("");

        dispatch(|| {
            a.set(1);
            b.set("one");
            a.update(|n| n * 10);
        })
        .unwrap();

        assert_eq!(renders.get(), 1);
        assert_eq!((a.get(), b.get()), (10, "one"));
    }

    #[test]
    fn test_get_before_boundary_is_stale() {
        let c = Component::new("c");
        let count = c.state(5);

        dispatch(|| {
            count.set(6);
            assert_eq!(count.get(), 5);
            assert_eq!(count.phase(), CellPhase::Queued);
            assert_eq!(count.pending(), 1);
        })
        .unwrap();

        assert_eq!(count.get(), 6);
        assert_eq!(count.phase(), CellPhase::Idle);
        assert_eq!(count.pending(), 0);
    }

    #[test]
    fn test_nested_dispatch_flushes_once() {
        let c = Component::new("c");
        let renders = counting(&c);
        let count = c.state(0);

        dispatch(|| {
            count.update(|n| n + 1);
            dispatch(|| count.update(|n| n + 1)).unwrap();
            assert_eq!(count.get(), 0);
        })
        .unwrap();

        assert_eq!(count.get(), 2);
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn test_destroy_discards_pending() {
        let c = Component::new("c");
        let renders = counting(&c);
        let count = c.state(0);

        count.update(|n| n + 1);
        count.update(|n| n + 1);
        assert!(has_pending());
        c.destroy();

        let report = flush().unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(renders.get(), 0);
        assert_eq!(count.pending(), 0);
    }

    #[test]
    fn test_use_after_destroy() {
        let c = Component::new("gone");
        let count = c.state(1);
        c.destroy();

        assert_eq!(
            count.try_get(),
            Err(StateError::UseAfterDestroy {
                component: "gone".to_string()
            })
        );
        assert!(count.try_request_update(2).is_err());
    }

    #[test]
    #[should_panic(expected = "used after it was destroyed")]
    fn test_get_after_destroy_panics() {
        let c = Component::new("gone");
        let count = c.state(1);
        c.destroy();
        count.get();
    }

    #[test]
    fn test_dropping_component_destroys_state() {
        let count = {
            let c = Component::new("dropped");
            c.state(1)
        };
        assert!(count.try_get().is_err());
        assert!(count.owner().is_none());
    }

    #[test]
    fn test_derivation_failure_keeps_applied() {
        let c = Component::new("c");
        let renders = counting(&c);
        let errors = Rc::new(RefCell::new(Vec::new()));
        c.on_error({
            let errors = errors.clone();
            move |e| errors.borrow_mut().push(e.clone())
        });
        let count = c.state(0);

        dispatch(|| {
            count.update(|n| n + 1);
            count.try_update(|_: &i32| Err::<i32, _>("refused"));
            count.update(|n| n + 100);
        })
        .unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(renders.get(), 1);
        assert_eq!(
            *errors.borrow(),
            vec![StateError::DerivationFailed {
                component: "c".to_string(),
                message: "refused".to_string(),
                applied: 1,
                dropped: 2,
            }]
        );
    }

    #[test]
    fn test_derivation_panic_aborts_other_cells() {
        let c = Component::new("c");
        let renders = counting(&c);
        let failures = Rc::new(Cell::new(0));
        c.on_error({
            let failures = failures.clone();
            move |_| failures.set(failures.get() + 1)
        });
        let a = c.state(0);
        let b = c.state(0);

        let report = {
            a.update(|_| panic!("boom"));
            b.set(7);
            flush().unwrap()
        };

        assert_eq!(report.failures, 1);
        assert_eq!(report.dropped, 2);
        assert_eq!((a.get(), b.get()), (0, 0));
        assert_eq!(failures.get(), 1);
        // nothing committed, nothing to redraw
        assert_eq!(renders.get(), 0);

        // the next cycle works normally
        dispatch(|| b.set(8)).unwrap();
        assert_eq!(b.get(), 8);
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn test_render_sees_new_value() {
        let c = Component::new("c");
        let count = c.state(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        c.on_render({
            let count = count.clone();
            let seen = seen.clone();
            move || seen.borrow_mut().push(count.get())
        });

        dispatch(|| count.update(|n| n + 3)).unwrap();
        dispatch(|| count.update(|n| n + 3)).unwrap();

        assert_eq!(*seen.borrow(), vec![3, 6]);
    }

    #[test]
    fn test_update_during_render_runs_next_cycle() {
        let c = Component::new("c");
        let count = c.state(0);
        c.on_render({
            let count = count.clone();
            move || {
                if count.get() < 3 {
                    count.update(|n| n + 1);
                }
            }
        });

        dispatch(|| count.set(1)).unwrap();

        assert_eq!(count.get(), 3);
        assert_eq!(c.render_count(), 3);
    }

    #[test]
    fn test_render_loop_is_cut() {
        configure(SchedulerConfig::default().with_max_nested_cycles(5));
        let c = Component::new("looping");
        let count = c.state(0);
        c.on_render({
            let count = count.clone();
            move || count.update(|n| n + 1)
        });

        let result = dispatch(|| count.set(1));

        assert_eq!(result, Err(StateError::RenderLoop { limit: 5 }));
        assert_eq!(count.get(), 5);
        assert!(!c.has_pending());
    }

    #[test]
    fn test_remember_state_is_order_based() {
        let c = Component::new("c");
        let cells = Rc::new(RefCell::new(Vec::new()));
        c.on_render({
            let cells = cells.clone();
            move || {
                let a = remember_state(|| 1);
                let b = remember_state(|| "b");
                cells.borrow_mut().push((a, b));
            }
        });

        c.render();
        let (a, _) = cells.borrow()[0].clone();
        dispatch(|| a.set(10)).unwrap();

        let cells = cells.borrow();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1].0.get(), 10);
        assert_eq!(cells[1].1.get(), "b");
    }

    #[test]
    fn test_current_component_inside_render() {
        let c = Component::new("outer");
        let name = Rc::new(RefCell::new(None));
        c.on_render({
            let name = name.clone();
            move || *name.borrow_mut() = current_component().map(|c| c.name().to_string())
        });

        assert!(current_component().is_none());
        c.render();
        assert_eq!(name.borrow().as_deref(), Some("outer"));
        assert!(current_component().is_none());
    }

    #[test]
    fn test_on_destroy_runs_once() {
        let disposed = Rc::new(Cell::new(0));
        let c = Component::new("c");
        c.on_destroy({
            let disposed = disposed.clone();
            move || disposed.set(disposed.get() + 1)
        });

        c.destroy();
        c.destroy();
        assert_eq!(disposed.get(), 1);
        assert!(!c.is_alive());
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let cleaned_up = Rc::new(Cell::new(false));

        let scope = Scope::new();
        let cleaned_up_clone = cleaned_up.clone();
        scope.add_disposer(move || cleaned_up_clone.set(true));

        assert!(!cleaned_up.get());
        scope.dispose();
        assert!(cleaned_up.get());
        assert!(scope.is_empty());
    }

    #[test]
    fn test_components_are_isolated() {
        let first = Component::new("first");
        let second = Component::new("second");
        let first_renders = counting(&first);
        let second_renders = counting(&second);
        let a = first.state(0);
        let b = second.state(0);

        dispatch(|| a.update(|n| n + 1)).unwrap();

        assert_eq!((a.get(), b.get()), (1, 0));
        assert_eq!((first_renders.get(), second_renders.get()), (1, 0));
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_flush_inside_handler_is_deferred() {
        let c = Component::new("c");
        let renders = counting(&c);
        let count = c.state(0);

        let seen = dispatch(|| {
            count.update(|n| n + 1);
            let report = flush().unwrap();
            assert!(report.is_empty());
            count.get()
        })
        .unwrap();

        assert_eq!(seen, 0);
        assert_eq!(count.get(), 1);
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn test_flush_inside_with_is_deferred() {
        let c = Component::new("c");
        let count = c.state(1);

        let seen = count.with(|n| {
            count.update(|m| m + 1);
            flush().unwrap();
            *n
        });

        assert_eq!(seen, 1);
        assert_eq!(count.pending(), 1);
        flush().unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_destroy_inside_drain_discards_rest() {
        let c = Component::new("c");
        let renders = counting(&c);
        let count = c.state(0);

        count.update({
            let c = c.clone();
            move |n| {
                c.destroy();
                n + 1
            }
        });
        count.update(|n| n + 1);
        count.update(|n| n + 1);
        let report = flush().unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(count.version(), 0);
        assert_eq!(count.pending(), 0);
        assert_eq!(renders.get(), 0);
        assert!(!c.is_alive());
    }

    #[test]
    #[should_panic(expected = "used after it was destroyed")]
    fn test_set_after_destroy_panics() {
        let c = Component::new("gone");
        let count = c.state(1);
        c.destroy();
        count.set(2);
    }

    #[test]
    #[should_panic(expected = "used after it was destroyed")]
    fn test_update_after_destroy_panics() {
        let c = Component::new("gone");
        let count = c.state(1);
        c.destroy();
        count.update(|n| n + 1);
    }

    #[test]
    #[should_panic(expected = "used after it was destroyed")]
    fn test_request_update_after_destroy_panics() {
        let c = Component::new("gone");
        let count = c.state(1);
        c.destroy();
        count.request_update(UpdateRequest::value(2));
    }

    #[test]
    fn test_registry_tracks_live_components() {
        let base = component_count();
        let kept = Component::new("kept");
        let destroyed = Component::new("destroyed");
        let dropped = Component::new("dropped");
        assert_eq!(component_count(), base + 3);

        destroyed.destroy();
        assert_eq!(component_count(), base + 2);

        drop(dropped);
        assert_eq!(component_count(), base + 1);

        kept.destroy();
        assert_eq!(component_count(), base);
    }
}
