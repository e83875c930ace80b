//! Player input and feedback layer for the submarine repairman game.
//!
//! ```text
//! Keyboard ─┐
//!           ├─► DeviceInputs ─► InputSystems ─► InputModeArbiter ─► watch<InputMode>
//! Gamepad  ─┘   (TickActivity)       │
//!                                    ├─► InputUi (cancel relay)
//!                                    └─► HapticsController ─► HapticDevice
//! ```
//!
//! Everything runs on one frame loop. The only deferred work is the
//! delayed haptic stop, which is a cancellable tokio task.

pub mod config;
pub mod danger;
pub mod haptics;
pub mod input;
