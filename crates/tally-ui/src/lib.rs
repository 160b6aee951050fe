#![allow(non_snake_case)]
//! Views, a headless host and the click-counter widgets.
//!
//! ```rust
//! use tally_ui::*;
//!
//! let host = Host::mount("counter", Counter);
//! host.click("Click me").unwrap();
//! assert_eq!(host.lines()[0], "You clicked 1 times");
//! ```

pub mod counter;
pub mod error;
pub mod host;
pub mod view;

use std::rc::Rc;

pub use counter::{Counter, DoubleCounter, StaleCounter};
pub use error::UiError;
pub use host::Host;
pub use view::{Callback, View, ViewId, ViewKind};

pub fn Column(children: Vec<View>) -> View {
    View::new(0, ViewKind::Column).with_children(children)
}

pub fn Text(text: impl Into<String>) -> View {
    View::new(0, ViewKind::Text { text: text.into() })
}

pub fn Button(text: impl Into<String>, on_click: impl Fn() + 'static) -> View {
    View::new(
        0,
        ViewKind::Button {
            text: text.into(),
            on_click: Some(Rc::new(on_click)),
        },
    )
}
