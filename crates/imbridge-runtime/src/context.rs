#![forbid(unsafe_code)]

//! Scoped activation of the GUI library's context.
//!
//! The library keeps one process-wide "current context". Every entry point
//! that touches input or frame state enters an [`ActiveContext`], which makes
//! the owning context current and, on drop, leaves no context current. Early
//! returns and `?` propagation deactivate as well.

use std::ops::{Deref, DerefMut};

use crate::collab::GuiContext;

/// RAII guard: the wrapped context is current for the guard's lifetime.
pub struct ActiveContext<'a, G: GuiContext> {
    gui: &'a mut G,
}

impl<'a, G: GuiContext> ActiveContext<'a, G> {
    /// Activate `gui` until the returned guard is dropped.
    pub fn enter(gui: &'a mut G) -> Self {
        gui.activate();
        Self { gui }
    }
}

impl<G: GuiContext> Deref for ActiveContext<'_, G> {
    type Target = G;

    fn deref(&self) -> &G {
        self.gui
    }
}

impl<G: GuiContext> DerefMut for ActiveContext<'_, G> {
    fn deref_mut(&mut self) -> &mut G {
        self.gui
    }
}

impl<G: GuiContext> Drop for ActiveContext<'_, G> {
    fn drop(&mut self) {
        self.gui.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::{CallLog, HostCall, RecordingGui};

    #[test]
    fn guard_activates_and_deactivates() {
        let log = CallLog::default();
        let mut gui = RecordingGui::new(log.clone());
        {
            let mut active = ActiveContext::enter(&mut gui);
            assert!(active.is_active());
            active.new_frame();
        }
        assert!(!gui.is_active());
        assert_eq!(
            log.snapshot(),
            vec![HostCall::Activate, HostCall::NewFrame, HostCall::Deactivate]
        );
        assert_eq!(gui.misuse_count(), 0);
    }

    #[test]
    fn early_return_still_deactivates() {
        fn fails(gui: &mut RecordingGui) -> Result<(), ()> {
            let _active = ActiveContext::enter(gui);
            Err(())
        }

        let log = CallLog::default();
        let mut gui = RecordingGui::new(log.clone());
        assert!(fails(&mut gui).is_err());
        assert!(!gui.is_active());
    }
}
