//! The click counter, in three versions.
//!
//! All three keep the count in component-local state. They differ only in
//! how the click handler asks for the next value:
//!
//! - `Counter` queues one derivation per click.
//! - `StaleCounter` reads once and queues two plain values computed from
//!   that read. Both are `n + 1`, so a click adds one, not two.
//! - `DoubleCounter` queues two derivations; each sees the result of the
//!   previous one, so a click adds two.

use tally_core::remember_state;

use crate::{Button, Column, Text, View};

fn label(count: u32) -> String {
    format!("You clicked {count} times")
}

pub fn Counter() -> View {
    let count = remember_state(|| 0u32);

    Column(vec![
        Text(label(count.get())),
        Button("Click me", move || count.update(|n| n + 1)),
    ])
}

pub fn StaleCounter() -> View {
    let count = remember_state(|| 0u32);

    Column(vec![
        Text(label(count.get())),
        Button("+2", move || {
            let n = count.get();
            count.set(n + 1);
            count.set(n + 1);
        }),
    ])
}

pub fn DoubleCounter() -> View {
    let count = remember_state(|| 0u32);

    Column(vec![
        Text(label(count.get())),
        Button("+2", move || {
            count.update(|n| n + 1);
            count.update(|n| n + 1);
        }),
    ])
}
