//! Input subsystem: device polling and input mode arbitration
//!
//! Runs as a single per-frame pipeline:
//!
//! 1. [`keyboard`] and [`gamepad`] - raw device activity for the tick
//! 2. [`source`] - the [`InputSource`] seam merging devices into [`TickActivity`]
//! 3. [`arbiter`] - decides the active [`InputMode`] and publishes changes
//! 4. [`ui`] - held UI actions (cancel) for menus
//! 5. [`systems`] - lifecycle owner tying the above to haptics
//!
//! ```text
//! Keyboard ─┐
//!           ├─► TickActivity ─► InputModeArbiter ─► watch<InputMode>
//! Gamepad  ─┘        └────────► InputUi ───────────► watch<bool>
//! ```

pub mod arbiter;
pub mod gamepad;
pub mod keyboard;
pub mod mode;
pub mod source;
pub mod systems;
pub mod ui;

pub use arbiter::InputModeArbiter;
pub use gamepad::{init_gilrs, select_active_gamepad, GilrsGamepad, SharedGilrs};
pub use keyboard::KeyboardMonitor;
pub use mode::InputMode;
pub use source::{ActionPhase, DeviceInputs, InputError, InputSource, TickActivity};
pub use systems::{Configured, Exited, InputSettings, InputSystems, Running};
pub use ui::InputUi;
