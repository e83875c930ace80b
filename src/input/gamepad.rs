use gilrs::{Button, Event, EventType, GamepadId, Gilrs};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use super::source::{ActionPhase, InputError, InputSource, TickActivity};

/// gilrs context shared between input polling and force feedback
pub type SharedGilrs = Arc<Mutex<Gilrs>>;

/// Brings up the gilrs context
pub fn init_gilrs() -> Result<SharedGilrs, InputError> {
    info!("Initializing gilrs controller interface");
    match Gilrs::new() {
        Ok(gilrs) => {
            info!("Successfully initialized gilrs");
            Ok(Arc::new(Mutex::new(gilrs)))
        }
        Err(e) => {
            error!("Failed to initialize gilrs: {}", e);
            Err(InputError::InitializationError(e.to_string()))
        }
    }
}

/// Picks the gamepad that receives haptic pulses
///
/// Prefers the first connected pad with force feedback, falling back to the
/// first connected pad at all.
pub fn select_active_gamepad(gilrs: &Gilrs) -> Option<GamepadId> {
    let mut fallback = None;
    let mut count = 0;

    for (id, gamepad) in gilrs.gamepads() {
        count += 1;
        info!(
            "  ID: {}, Name: {}, force feedback: {}",
            id,
            gamepad.name(),
            gamepad.is_ff_supported()
        );
        if gamepad.is_ff_supported() {
            info!("Selected gamepad: {} ({})", gamepad.name(), id);
            return Some(id);
        }
        if fallback.is_none() {
            fallback = Some(id);
        }
    }

    match fallback {
        Some(id) => {
            warn!("No gamepad with force feedback among {}, using {}", count, id);
            Some(id)
        }
        None => {
            warn!("No gamepad connected, continuing without haptics");
            None
        }
    }
}

/// Gamepads as an input source
///
/// Button and axis events drained during a tick count as a gamepad update.
/// Connection bookkeeping and force feedback notifications do not.
#[derive(Debug)]
pub struct GilrsGamepad {
    gilrs: SharedGilrs,
}

impl GilrsGamepad {
    pub fn new(gilrs: SharedGilrs) -> Self {
        Self { gilrs }
    }
}

impl InputSource for GilrsGamepad {
    fn poll_activity(&mut self) -> TickActivity {
        let mut activity = TickActivity::idle();
        let mut gilrs = match self.gilrs.lock() {
            Ok(gilrs) => gilrs,
            Err(e) => {
                error!("gilrs context unavailable: {}", e);
                return activity;
            }
        };

        while let Some(Event { id, event, .. }) = gilrs.next_event() {
            match event {
                EventType::Connected => {
                    info!("Controller {} connected", id);
                }
                EventType::Disconnected => {
                    warn!("Controller {} disconnected", id);
                }
                EventType::ButtonPressed(button, _) => {
                    activity.gamepad_updated = true;
                    if let Some(phase) = cancel_phase(button, false) {
                        debug!("Gamepad cancel: {:?}", phase);
                        activity.cancel = Some(phase);
                    }
                }
                EventType::ButtonReleased(button, _) => {
                    activity.gamepad_updated = true;
                    if let Some(phase) = cancel_phase(button, true) {
                        debug!("Gamepad cancel: {:?}", phase);
                        activity.cancel = Some(phase);
                    }
                }
                EventType::ButtonRepeated(..)
                | EventType::ButtonChanged(..)
                | EventType::AxisChanged(..) => {
                    activity.gamepad_updated = true;
                }
                other => {
                    debug!("Ignoring gamepad event {:?} from {}", other, id);
                }
            }
        }

        activity
    }
}

/// East face button drives the UI cancel action
fn cancel_phase(button: Button, released: bool) -> Option<ActionPhase> {
    if button != Button::East {
        return None;
    }
    if released {
        Some(ActionPhase::Canceled)
    } else {
        Some(ActionPhase::Performed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn east_button_is_cancel() {
        assert_eq!(
            cancel_phase(Button::East, false),
            Some(ActionPhase::Performed)
        );
        assert_eq!(cancel_phase(Button::East, true), Some(ActionPhase::Canceled));
        assert_eq!(cancel_phase(Button::South, false), None);
    }
}
