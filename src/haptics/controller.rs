use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::device::{HapticDevice, HapticsError, SharedDevice};

/// Persisted vibration configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticSettings {
    /// Player-facing switch; when off every pulse is a silent success
    pub vibration_enabled: bool,

    /// Low-frequency (heavy) motor level, `0.0..=1.0`
    pub low_frequency_motor: f32,

    /// High-frequency (light) motor level, `0.0..=1.0`
    pub high_frequency_motor: f32,

    /// Time until a pulse is stopped again
    pub stop_delay_ms: u64,
}

impl Default for HapticSettings {
    fn default() -> Self {
        Self {
            vibration_enabled: true,
            low_frequency_motor: 0.8,
            high_frequency_motor: 0.0,
            stop_delay_ms: 300,
        }
    }
}

impl HapticSettings {
    /// The pulse played by [`HapticsController::play_vibration`]
    pub fn pulse(&self) -> HapticPulse {
        HapticPulse {
            low_frequency: self.low_frequency_motor,
            high_frequency: self.high_frequency_motor,
            duration: Duration::from_millis(self.stop_delay_ms),
        }
    }

    /// Clamps motor levels into range
    pub fn normalize(&mut self) {
        let low = self.low_frequency_motor.clamp(0.0, 1.0);
        let high = self.high_frequency_motor.clamp(0.0, 1.0);
        if low != self.low_frequency_motor || high != self.high_frequency_motor {
            warn!(
                "Motor levels out of range ({}, {}), clamped to ({}, {})",
                self.low_frequency_motor, self.high_frequency_motor, low, high
            );
        }
        self.low_frequency_motor = low;
        self.high_frequency_motor = high;
    }
}

/// One timed rumble
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HapticPulse {
    pub low_frequency: f32,
    pub high_frequency: f32,
    pub duration: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HapticState {
    #[default]
    Idle,
    Vibrating,
}

#[derive(Debug)]
struct PendingStop {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Plays timed vibration pulses on the active gamepad
///
/// `Idle -> Vibrating` on a successful pulse, and back to `Idle` when the
/// delay elapses or [`HapticsController::stop_vibration`] runs. A new pulse
/// while vibrating replaces the pending stop, so the delay restarts from the
/// latest pulse.
///
/// Device failures never escape: they are logged and surface as `false`.
/// Dropping the controller stops the motors, and a controller that has been
/// shut down refuses further pulses.
#[derive(Debug)]
pub struct HapticsController {
    settings: HapticSettings,
    device: Option<SharedDevice>,
    state_sender: Arc<watch::Sender<HapticState>>,
    pending_stop: Option<PendingStop>,
    torn_down: bool,
}

impl HapticsController {
    pub fn new(settings: HapticSettings, device: Option<SharedDevice>) -> Self {
        info!(
            "Creating haptics controller: enabled={}, device={}",
            settings.vibration_enabled,
            device.is_some()
        );
        let (state_sender, _) = watch::channel(HapticState::Idle);
        Self {
            settings,
            device,
            state_sender: Arc::new(state_sender),
            pending_stop: None,
            torn_down: false,
        }
    }

    pub fn settings(&self) -> &HapticSettings {
        &self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.vibration_enabled
    }

    pub fn state(&self) -> HapticState {
        *self.state_sender.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<HapticState> {
        self.state_sender.subscribe()
    }

    /// Plays the configured pulse
    pub fn play_vibration(&mut self) -> bool {
        let pulse = self.settings.pulse();
        self.play_pulse(pulse)
    }

    /// Sets both motors and schedules their reset after `pulse.duration`
    ///
    /// Must be called from within a tokio runtime when vibration is
    /// enabled; otherwise the pulse is refused.
    pub fn play_pulse(&mut self, pulse: HapticPulse) -> bool {
        if self.torn_down {
            warn!("Haptics controller already shut down, refusing vibration");
            return false;
        }
        if !self.settings.vibration_enabled {
            info!("Vibration disabled by configuration");
            return true;
        }
        let Some(device) = self.device.clone() else {
            warn!("No haptic device available, skipping vibration");
            return true;
        };
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("{}", HapticsError::Scheduling(e.to_string()));
                return false;
            }
        };

        let set_result = match device.lock() {
            Ok(mut guard) => {
                let result = guard.set_motor_speeds(pulse.low_frequency, pulse.high_frequency);
                // Superseded under the device lock so an expiring stop cannot
                // cut the new pulse short. A failed set keeps the old stop.
                if result.is_ok() {
                    self.cancel_pending_stop();
                }
                result
            }
            Err(e) => Err(HapticsError::DeviceCommunication(format!(
                "device lock poisoned: {}",
                e
            ))),
        };
        if let Err(e) = set_result {
            error!("Failed to start vibration: {}", e);
            return false;
        }

        debug!(
            "Vibration started: low={:.2} high={:.2} for {:?}",
            pulse.low_frequency, pulse.high_frequency, pulse.duration
        );
        publish(&self.state_sender, HapticState::Vibrating);

        let token = CancellationToken::new();
        let task = runtime.spawn(delayed_stop(
            device,
            self.state_sender.clone(),
            token.clone(),
            pulse.duration,
        ));
        self.pending_stop = Some(PendingStop { token, task });
        true
    }

    /// Resets the motors now and drops any pending stop
    pub fn stop_vibration(&mut self) -> bool {
        self.cancel_pending_stop();
        let Some(device) = self.device.as_ref() else {
            publish(&self.state_sender, HapticState::Idle);
            return true;
        };
        match device.lock() {
            Ok(mut guard) => reset_locked(&mut **guard, &self.state_sender),
            Err(e) => {
                error!("Failed to stop vibration: device lock poisoned: {}", e);
                false
            }
        }
    }

    /// Forces the motors off for good; later calls are no-ops
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        debug!("Tearing down haptics controller");
        if !self.stop_vibration() {
            error!("Failed to stop vibration during teardown");
        }
    }

    fn cancel_pending_stop(&mut self) {
        if let Some(pending) = self.pending_stop.take() {
            if !pending.task.is_finished() {
                debug!("Superseding pending vibration stop");
            }
            pending.token.cancel();
        }
    }
}

impl Drop for HapticsController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn delayed_stop(
    device: SharedDevice,
    state_sender: Arc<watch::Sender<HapticState>>,
    token: CancellationToken,
    delay: Duration,
) {
    tokio::select! {
        _ = token.cancelled() => {
            debug!("Pending vibration stop cancelled");
        }
        _ = tokio::time::sleep(delay) => {
            match device.lock() {
                Ok(mut guard) => {
                    // A newer pulse may have claimed the device meanwhile
                    if token.is_cancelled() {
                        debug!("Vibration stop superseded at expiry");
                        return;
                    }
                    if !reset_locked(&mut **guard, &state_sender) {
                        error!("Failed to stop vibration after delay");
                    }
                }
                Err(e) => error!("Failed to stop vibration: device lock poisoned: {}", e),
            }
        }
    }
}

fn reset_locked(device: &mut dyn HapticDevice, state_sender: &watch::Sender<HapticState>) -> bool {
    match device.reset_haptics() {
        Ok(()) => {
            debug!("Vibration stopped");
            publish(state_sender, HapticState::Idle);
            true
        }
        Err(e) => {
            error!("Failed to stop vibration: {}", e);
            false
        }
    }
}

fn publish(state_sender: &watch::Sender<HapticState>, next: HapticState) {
    state_sender.send_if_modified(|state| {
        if *state == next {
            false
        } else {
            *state = next;
            true
        }
    });
}
