//! Consent toggle affordance
//!
//! A [`ToggleControl`] is the one UI hook this library defines: a labeled
//! trigger that, when activated, invokes a host-supplied callback with no
//! arguments. The callback typically opens the host's consent-editing
//! surface. The control holds no state of its own; how it is rendered and
//! what "activation" means belong to the host.

/// Stateless trigger for opening a consent-editing surface
pub struct ToggleControl {
    label: String,
    on_activate: Box<dyn FnMut()>,
}

impl ToggleControl {
    pub fn new(label: impl Into<String>, on_activate: impl FnMut() + 'static) -> Self {
        Self {
            label: label.into(),
            on_activate: Box::new(on_activate),
        }
    }

    /// The label the host renders on the affordance
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Invoke the callback
    pub fn activate(&mut self) {
        (self.on_activate)();
    }
}

impl std::fmt::Debug for ToggleControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToggleControl")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_activate_invokes_callback() {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let mut toggle = ToggleControl::new("Manage consent", move || {
            counter.set(counter.get() + 1);
        });

        assert_eq!(toggle.label(), "Manage consent");
        toggle.activate();
        toggle.activate();
        assert_eq!(count.get(), 2);
    }
}
