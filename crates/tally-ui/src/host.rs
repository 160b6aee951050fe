use std::cell::RefCell;
use std::rc::Rc;

use tally_core::{Component, dispatch};

use crate::error::UiError;
use crate::view::View;

/// Mounts one component and drives it without a window: clicks are
/// dispatched by button label and output is read back as text lines.
pub struct Host {
    component: Component,
    tree: Rc<RefCell<Option<View>>>,
}

impl Host {
    /// Creates the component, wires its render callback to `view` and renders
    /// once.
    pub fn mount(name: impl Into<String>, view: impl Fn() -> View + 'static) -> Self {
        let component = Component::new(name);
        let tree = Rc::new(RefCell::new(None));
        component.on_render({
            let tree = tree.clone();
            move || {
                let v = view();
                *tree.borrow_mut() = Some(v);
            }
        });
        component.render();
        Self { component, tree }
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Runs the handler of the button labelled `label`. Its updates are
    /// applied, and the view rebuilt, before this returns.
    pub fn click(&self, label: &str) -> Result<(), UiError> {
        if !self.component.is_alive() {
            return Err(UiError::Unmounted);
        }
        let on_click = self
            .tree
            .borrow()
            .as_ref()
            .and_then(|v| v.find_button(label))
            .ok_or_else(|| UiError::NoSuchButton(label.to_string()))?;

        log::debug!("click '{}' on '{}'", label, self.component.name());
        dispatch(|| on_click())?;
        Ok(())
    }

    pub fn lines(&self) -> Vec<String> {
        self.tree
            .borrow()
            .as_ref()
            .map(View::lines)
            .unwrap_or_default()
    }

    pub fn render_count(&self) -> u64 {
        self.component.render_count()
    }

    pub fn unmount(&self) {
        self.component.destroy();
        self.tree.borrow_mut().take();
    }
}
