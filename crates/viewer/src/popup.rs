use tracing::debug;

use crate::event::{Effect, PopupView};

#[derive(Debug, Clone, PartialEq)]
pub enum PopupState {
    Closed,
    /// `fresh` is set while the event that opened the popup is still being
    /// handled; the outside-click path ignores it until the tick boundary.
    Open { view: PopupView, fresh: bool },
}

/// Single popup slot.
#[derive(Debug, Clone)]
pub struct PopupController {
    state: PopupState,
}

impl Default for PopupController {
    fn default() -> Self {
        Self::new()
    }
}

impl PopupController {
    pub fn new() -> Self {
        Self {
            state: PopupState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PopupState::Open { .. })
    }

    pub fn view(&self) -> Option<&PopupView> {
        match &self.state {
            PopupState::Open { view, .. } => Some(view),
            PopupState::Closed => None,
        }
    }

    /// Replace whatever is showing with `view`.
    pub fn show(&mut self, view: PopupView, effects: &mut Vec<Effect>) {
        if self.is_open() {
            effects.push(Effect::HidePopup);
            debug!("popup removed");
        }
        debug!(description = %view.description, "popup created");
        effects.push(Effect::ShowPopup(view.clone()));
        self.state = PopupState::Open { view, fresh: true };
    }

    /// Outside-click path: close unless the popup was opened by this event.
    pub fn dismiss_outside(&mut self, effects: &mut Vec<Effect>) {
        if let PopupState::Open { fresh: false, .. } = self.state {
            self.state = PopupState::Closed;
            effects.push(Effect::HidePopup);
            debug!("popup removed");
        }
    }

    pub fn end_tick(&mut self) {
        if let PopupState::Open { fresh, .. } = &mut self.state {
            *fresh = false;
        }
    }
}
