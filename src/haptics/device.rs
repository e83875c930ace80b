use std::fmt;
use std::sync::{Arc, Mutex};

/// Errors raised while talking to a rumble device
#[derive(Debug, thiserror::Error)]
pub enum HapticsError {
    /// The device rejected or failed a motor command
    #[error("Device communication error: {0}")]
    DeviceCommunication(String),

    /// A scheduled pulse could not be timed
    #[error("Scheduling error: {0}")]
    Scheduling(String),
}

/// Two-motor rumble output of a gamepad
///
/// Levels are normalized to `0.0..=1.0`; `low` drives the low-frequency
/// (heavy) motor and `high` the high-frequency (light) one.
pub trait HapticDevice: Send + fmt::Debug {
    fn set_motor_speeds(&mut self, low: f32, high: f32) -> Result<(), HapticsError>;

    /// Returns both motors to rest. Must be safe to call when already idle.
    fn reset_haptics(&mut self) -> Result<(), HapticsError>;
}

pub type SharedDevice = Arc<Mutex<Box<dyn HapticDevice>>>;

pub fn share_device(device: Box<dyn HapticDevice>) -> SharedDevice {
    Arc::new(Mutex::new(device))
}
