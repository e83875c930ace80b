use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Replay, Ticks};
use gilrs::GamepadId;
use std::fmt;
use tracing::{debug, info};

use super::device::{HapticDevice, HapticsError};
use crate::input::gamepad::SharedGilrs;

/// Upper bound on a single effect; the controller stops pulses long before
const EFFECT_HOLD_MS: u32 = 10_000;

/// Force-feedback rumble on one gilrs gamepad
///
/// The low-frequency motor maps to a `Strong` base effect and the
/// high-frequency motor to a `Weak` one. Without a gamepad every command is
/// a successful no-op.
pub struct GilrsRumble {
    gilrs: SharedGilrs,
    gamepad: Option<GamepadId>,
    active_effect: Option<Effect>,
}

impl GilrsRumble {
    pub fn new(gilrs: SharedGilrs, gamepad: Option<GamepadId>) -> Self {
        info!("Creating gilrs rumble for gamepad {:?}", gamepad);
        Self {
            gilrs,
            gamepad,
            active_effect: None,
        }
    }

    fn build_effect(&self, gamepad: GamepadId, low: f32, high: f32) -> Result<Effect, HapticsError> {
        let mut gilrs = self
            .gilrs
            .lock()
            .map_err(|e| HapticsError::DeviceCommunication(format!("gilrs lock poisoned: {}", e)))?;

        EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong {
                    magnitude: motor_magnitude(low),
                },
                scheduling: hold_scheduling(),
                ..Default::default()
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak {
                    magnitude: motor_magnitude(high),
                },
                scheduling: hold_scheduling(),
                ..Default::default()
            })
            .gamepads(&[gamepad])
            .finish(&mut gilrs)
            .map_err(|e| HapticsError::DeviceCommunication(e.to_string()))
    }
}

impl HapticDevice for GilrsRumble {
    fn set_motor_speeds(&mut self, low: f32, high: f32) -> Result<(), HapticsError> {
        let Some(gamepad) = self.gamepad else {
            debug!("No rumble gamepad, ignoring motor speeds");
            return Ok(());
        };

        // Replacing a running effect must not leave the old one playing
        self.reset_haptics()?;

        let effect = self.build_effect(gamepad, low, high)?;
        effect
            .play()
            .map_err(|e| HapticsError::DeviceCommunication(e.to_string()))?;
        debug!("Rumble started on {}: low={:.2} high={:.2}", gamepad, low, high);
        self.active_effect = Some(effect);
        Ok(())
    }

    fn reset_haptics(&mut self) -> Result<(), HapticsError> {
        if let Some(effect) = self.active_effect.take() {
            effect
                .stop()
                .map_err(|e| HapticsError::DeviceCommunication(e.to_string()))?;
            debug!("Rumble stopped");
        }
        Ok(())
    }
}

impl fmt::Debug for GilrsRumble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GilrsRumble")
            .field("gamepad", &self.gamepad)
            .field("active", &self.active_effect.is_some())
            .finish()
    }
}

fn hold_scheduling() -> Replay {
    Replay {
        play_for: Ticks::from_ms(EFFECT_HOLD_MS),
        ..Default::default()
    }
}

fn motor_magnitude(level: f32) -> u16 {
    (level.clamp(0.0, 1.0) * f32::from(u16::MAX)).round() as u16
}
