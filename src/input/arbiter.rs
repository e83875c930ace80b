use tokio::sync::watch;
use tracing::{debug, info};

use super::mode::InputMode;
use super::source::TickActivity;

/// Tracks which device class was used most recently
///
/// The current mode lives in a `watch` channel so UI collaborators can
/// react to switches. Subscribers are only woken when the mode actually
/// changes; re-evaluating to the same mode is silent.
#[derive(Debug)]
pub struct InputModeArbiter {
    mode_sender: watch::Sender<InputMode>,
}

impl InputModeArbiter {
    pub fn new(initial: InputMode) -> Self {
        debug!("Creating input mode arbiter, initial mode: {}", initial);
        let (mode_sender, _) = watch::channel(initial);
        Self { mode_sender }
    }

    /// Applies one tick of device activity and returns the resulting mode
    ///
    /// Keyboard activity wins over gamepad activity in the same tick. With
    /// no activity at all the previous mode is kept.
    pub fn evaluate(&self, activity: &TickActivity) -> InputMode {
        let next = if activity.key_pressed {
            Some(InputMode::Keyboard)
        } else if activity.gamepad_updated {
            Some(InputMode::Gamepad)
        } else {
            None
        };

        if let Some(next) = next {
            let changed = self.mode_sender.send_if_modified(|mode| {
                if *mode == next {
                    false
                } else {
                    *mode = next;
                    true
                }
            });
            if changed {
                info!("Input mode switched to {}", next);
            }
        }

        self.current()
    }

    /// Forces the mode without consulting device activity
    pub fn reset(&self, mode: InputMode) {
        debug!("Resetting input mode to {}", mode);
        self.mode_sender.send_if_modified(|current| {
            if *current == mode {
                false
            } else {
                *current = mode;
                true
            }
        });
    }

    pub fn current(&self) -> InputMode {
        *self.mode_sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<InputMode> {
        self.mode_sender.subscribe()
    }
}

impl Default for InputModeArbiter {
    fn default() -> Self {
        Self::new(InputMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_wins_same_tick_tie() {
        let arbiter = InputModeArbiter::new(InputMode::Gamepad);
        let both = TickActivity {
            key_pressed: true,
            gamepad_updated: true,
            cancel: None,
        };
        assert_eq!(arbiter.evaluate(&both), InputMode::Keyboard);
    }

    #[test]
    fn idle_tick_keeps_previous_mode() {
        let arbiter = InputModeArbiter::new(InputMode::Gamepad);
        arbiter.evaluate(&TickActivity::keyboard());
        assert_eq!(arbiter.evaluate(&TickActivity::idle()), InputMode::Keyboard);
    }

    #[test]
    fn reset_overrides_current_mode() {
        let arbiter = InputModeArbiter::new(InputMode::Keyboard);
        arbiter.reset(InputMode::Gamepad);
        assert_eq!(arbiter.current(), InputMode::Gamepad);
    }
}
