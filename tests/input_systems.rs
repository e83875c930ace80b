use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use repairman::haptics::{
    share_device, HapticDevice, HapticSettings, HapticState, HapticsController, HapticsError,
};
use repairman::input::{
    ActionPhase, InputMode, InputSettings, InputSource, InputSystems, TickActivity,
};

/// Replays queued activity, then reports idle ticks
#[derive(Debug, Clone, Default)]
struct ScriptedInput {
    queue: Arc<Mutex<VecDeque<TickActivity>>>,
}

impl ScriptedInput {
    fn push(&self, activity: TickActivity) {
        self.queue.lock().unwrap().push_back(activity);
    }
}

impl InputSource for ScriptedInput {
    fn poll_activity(&mut self) -> TickActivity {
        self.queue.lock().unwrap().pop_front().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
struct Motors {
    levels: Arc<Mutex<(f32, f32)>>,
}

impl HapticDevice for Motors {
    fn set_motor_speeds(&mut self, low: f32, high: f32) -> Result<(), HapticsError> {
        *self.levels.lock().unwrap() = (low, high);
        Ok(())
    }

    fn reset_haptics(&mut self) -> Result<(), HapticsError> {
        *self.levels.lock().unwrap() = (0.0, 0.0);
        Ok(())
    }
}

fn systems_with(
    settings: InputSettings,
) -> (InputSystems<repairman::input::Configured>, ScriptedInput, Motors) {
    let input = ScriptedInput::default();
    let motors = Motors::default();
    let haptics = HapticsController::new(
        HapticSettings::default(),
        Some(share_device(Box::new(motors.clone()))),
    );
    let systems = InputSystems::create(Box::new(input.clone()), haptics, settings);
    (systems, input, motors)
}

#[test]
fn start_resets_to_initial_mode_and_ticks_arbitrate() {
    let (systems, input, _) = systems_with(InputSettings {
        initial_mode: InputMode::Keyboard,
        ..Default::default()
    });
    let mut systems = systems.start();
    assert_eq!(systems.current_input_mode(), InputMode::Keyboard);

    input.push(TickActivity::gamepad());
    input.push(TickActivity::idle());
    input.push(TickActivity {
        key_pressed: true,
        gamepad_updated: true,
        cancel: None,
    });

    assert_eq!(systems.tick(), InputMode::Gamepad);
    assert_eq!(systems.tick(), InputMode::Gamepad);
    assert_eq!(systems.tick(), InputMode::Keyboard);
}

#[test]
fn cancel_is_relayed_until_exit() {
    let (systems, input, _) = systems_with(InputSettings::default());
    let mut systems = systems.start();
    let mut canceled = systems.input_ui().subscribe_canceled();

    input.push(TickActivity::gamepad().with_cancel(ActionPhase::Performed));
    systems.tick();
    assert!(systems.input_ui().is_canceled());
    assert!(canceled.has_changed().unwrap());
    canceled.borrow_and_update();

    let exited = systems.exit();
    assert!(!exited.input_ui().is_canceled());
    assert!(!exited.input_ui().is_enabled());
    assert!(canceled.has_changed().unwrap());
    exited.shutdown();
}

#[tokio::test(start_paused = true)]
async fn shutdown_after_exit_stops_vibration() {
    let (systems, _, motors) = systems_with(InputSettings::default());
    let mut systems = systems.start();

    assert!(systems.play_vibration());
    assert_eq!(*motors.levels.lock().unwrap(), (0.8, 0.0));
    assert_eq!(systems.haptics().state(), HapticState::Vibrating);

    systems.exit().shutdown();
    assert_eq!(*motors.levels.lock().unwrap(), (0.0, 0.0));
}

#[tokio::test(start_paused = true)]
async fn run_loop_ticks_until_cancelled() {
    let (systems, input, _) = systems_with(InputSettings {
        tick_interval_ms: 16,
        initial_mode: InputMode::Gamepad,
    });
    let mut systems = systems.start();
    input.push(TickActivity::idle());
    input.push(TickActivity::keyboard());

    let shutdown = CancellationToken::new();
    let stop = shutdown.clone();
    let mut seen = Vec::new();

    systems
        .run(shutdown, |_, mode| {
            seen.push(mode);
            if seen.len() == 5 {
                stop.cancel();
            }
        })
        .await;

    assert_eq!(
        seen,
        vec![
            InputMode::Gamepad,
            InputMode::Keyboard,
            InputMode::Keyboard,
            InputMode::Keyboard,
            InputMode::Keyboard,
        ]
    );
    assert_eq!(systems.current_input_mode(), InputMode::Keyboard);
}

#[tokio::test(start_paused = true)]
async fn run_loop_callback_can_vibrate() {
    let (systems, input, motors) = systems_with(InputSettings::default());
    let mut systems = systems.start();
    input.push(TickActivity::gamepad().with_cancel(ActionPhase::Performed));

    let shutdown = CancellationToken::new();
    let stop = shutdown.clone();

    systems
        .run(shutdown, |systems, _| {
            if systems.input_ui().is_canceled() {
                assert!(systems.play_vibration());
                stop.cancel();
            }
        })
        .await;

    assert_eq!(*motors.levels.lock().unwrap(), (0.8, 0.0));
    systems.exit().shutdown();
    assert_eq!(*motors.levels.lock().unwrap(), (0.0, 0.0));
}
