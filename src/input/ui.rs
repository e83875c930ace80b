//! Relay for UI button actions read by the stage-select menus.

use tokio::sync::watch;
use tracing::{debug, info};

use super::source::ActionPhase;

/// Held state of the UI actions
///
/// Menus poll [`InputUi::is_canceled`] or subscribe to it. Calling
/// [`InputUi::disable_all`] drops every held action and mutes the relay
/// until it is enabled again.
#[derive(Debug)]
pub struct InputUi {
    canceled: watch::Sender<bool>,
    enabled: bool,
}

impl InputUi {
    pub fn new() -> Self {
        let (canceled, _) = watch::channel(false);
        Self {
            canceled,
            enabled: false,
        }
    }

    pub fn enable(&mut self) {
        debug!("UI input enabled");
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Applies one phase of the cancel action
    pub fn apply(&mut self, phase: ActionPhase) {
        if !self.enabled {
            debug!("UI input disabled, ignoring cancel {:?}", phase);
            return;
        }
        let pressed = match phase {
            ActionPhase::Started | ActionPhase::Performed => true,
            ActionPhase::Canceled => false,
        };
        self.set_canceled(pressed);
    }

    pub fn is_canceled(&self) -> bool {
        *self.canceled.borrow()
    }

    pub fn subscribe_canceled(&self) -> watch::Receiver<bool> {
        self.canceled.subscribe()
    }

    /// Releases every held action and stops accepting new ones
    pub fn disable_all(&mut self) {
        info!("Disabling all UI input");
        self.set_canceled(false);
        self.enabled = false;
    }

    fn set_canceled(&self, pressed: bool) {
        self.canceled.send_if_modified(|current| {
            if *current == pressed {
                false
            } else {
                *current = pressed;
                true
            }
        });
    }
}

impl Default for InputUi {
    fn default() -> Self {
        Self::new()
    }
}
