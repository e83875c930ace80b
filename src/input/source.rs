use std::fmt;
use tracing::debug;

/// Phase of a UI button action within one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionPhase {
    Started,
    Performed,
    Canceled,
}

/// Device activity observed during a single tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickActivity {
    /// Any keyboard key went down this tick
    pub key_pressed: bool,
    /// The gamepad reported any state update this tick
    pub gamepad_updated: bool,
    /// Latest phase of the cancel action, if it changed
    pub cancel: Option<ActionPhase>,
}

impl TickActivity {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn keyboard() -> Self {
        Self {
            key_pressed: true,
            ..Self::default()
        }
    }

    pub fn gamepad() -> Self {
        Self {
            gamepad_updated: true,
            ..Self::default()
        }
    }

    pub fn with_cancel(mut self, phase: ActionPhase) -> Self {
        self.cancel = Some(phase);
        self
    }

    /// Folds another source's activity into this one
    pub fn merge(&mut self, other: TickActivity) {
        self.key_pressed |= other.key_pressed;
        self.gamepad_updated |= other.gamepad_updated;
        if other.cancel.is_some() {
            self.cancel = other.cancel;
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.key_pressed && !self.gamepad_updated && self.cancel.is_none()
    }
}

/// Errors raised while bringing up an input device
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to initialize input device: {0}")]
    InitializationError(String),
}

/// Per-tick view of one input device
///
/// Called exactly once per frame. A device that is not present simply
/// reports [`TickActivity::idle`].
pub trait InputSource: Send + fmt::Debug {
    fn poll_activity(&mut self) -> TickActivity;
}

/// Several sources polled together as one
#[derive(Debug, Default)]
pub struct DeviceInputs {
    sources: Vec<Box<dyn InputSource>>,
}

impl DeviceInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Box<dyn InputSource>) -> Self {
        self.push(source);
        self
    }

    pub fn push(&mut self, source: Box<dyn InputSource>) {
        debug!("Registering input source: {:?}", source);
        self.sources.push(source);
    }
}

impl InputSource for DeviceInputs {
    fn poll_activity(&mut self) -> TickActivity {
        // Every source is drained each tick, even once one reports activity
        let mut activity = TickActivity::idle();
        for source in &mut self.sources {
            activity.merge(source.poll_activity());
        }
        activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug)]
    struct Script(VecDeque<TickActivity>);

    impl InputSource for Script {
        fn poll_activity(&mut self) -> TickActivity {
            self.0.pop_front().unwrap_or_default()
        }
    }

    #[test]
    fn merge_ors_flags_and_keeps_latest_cancel() {
        let mut activity = TickActivity::keyboard().with_cancel(ActionPhase::Performed);
        activity.merge(TickActivity::gamepad().with_cancel(ActionPhase::Canceled));
        assert!(activity.key_pressed);
        assert!(activity.gamepad_updated);
        assert_eq!(activity.cancel, Some(ActionPhase::Canceled));

        activity.merge(TickActivity::idle());
        assert_eq!(activity.cancel, Some(ActionPhase::Canceled));
    }

    #[test]
    fn device_inputs_drains_every_source() {
        let keyboard = Script(VecDeque::from(vec![TickActivity::keyboard()]));
        let gamepad = Script(VecDeque::from(vec![
            TickActivity::gamepad(),
            TickActivity::gamepad(),
        ]));
        let mut inputs = DeviceInputs::new()
            .with_source(Box::new(keyboard))
            .with_source(Box::new(gamepad));

        let first = inputs.poll_activity();
        assert!(first.key_pressed && first.gamepad_updated);

        let second = inputs.poll_activity();
        assert!(!second.key_pressed && second.gamepad_updated);

        assert!(inputs.poll_activity().is_idle());
    }

    #[test]
    fn empty_inputs_report_no_activity() {
        let mut inputs = DeviceInputs::new();
        assert!(inputs.poll_activity().is_idle());
    }
}
