//! Gamepad vibration feedback
//!
//! 1. [`device`] - the two-motor rumble abstraction
//! 2. [`rumble`] - gilrs force feedback behind that abstraction
//! 3. [`controller`] - timed pulses, configuration gating and teardown
//!
//! # Pulse lifecycle
//!
//! ```text
//! Idle ──play_vibration()──► Vibrating ──delay elapsed / stop_vibration()──► Idle
//!                               │  ▲
//!                               └──┘ play_vibration() restarts the delay
//! ```

pub mod controller;
pub mod device;
pub mod rumble;

pub use controller::{HapticPulse, HapticSettings, HapticState, HapticsController};
pub use device::{share_device, HapticDevice, HapticsError, SharedDevice};
pub use rumble::GilrsRumble;
