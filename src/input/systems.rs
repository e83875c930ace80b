use chrono::Local;
use serde::{Deserialize, Serialize};
use statum::{machine, state};
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::arbiter::InputModeArbiter;
use super::mode::InputMode;
use super::source::InputSource;
use super::ui::InputUi;
use crate::haptics::HapticsController;

/// Frame loop configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Period of one input tick in milliseconds
    ///
    /// 16ms matches a 60Hz frame; input mode switches are only ever
    /// observed at tick granularity.
    pub tick_interval_ms: u64,

    /// Mode reported before any device has been touched
    pub initial_mode: InputMode,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            initial_mode: InputMode::Gamepad,
        }
    }
}

impl InputSettings {
    pub fn normalize(&mut self) {
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = 1;
        }
    }
}

#[state]
#[derive(Debug, Clone)]
pub enum LifecycleState {
    Configured,
    Running,
    Exited,
}

/// Owner of the scene's input: device polling, mode arbitration, the UI
/// relay and haptics
///
/// `Configured -> Running -> Exited`. Only a running owner can tick, so
/// nothing is polled before `start` or after `exit`.
#[machine]
#[derive(Debug)]
pub struct InputSystems<S: LifecycleState> {
    source: Box<dyn InputSource>,
    arbiter: InputModeArbiter,
    input_ui: InputUi,
    haptics: HapticsController,
    settings: InputSettings,
}

// Available in every state
impl<S: LifecycleState> InputSystems<S> {
    pub fn current_input_mode(&self) -> InputMode {
        self.arbiter.current()
    }

    pub fn subscribe_input_mode(&self) -> watch::Receiver<InputMode> {
        debug!("New subscriber to input mode");
        self.arbiter.subscribe()
    }

    pub fn input_ui(&self) -> &InputUi {
        &self.input_ui
    }

    pub fn haptics(&self) -> &HapticsController {
        &self.haptics
    }

    pub fn settings(&self) -> &InputSettings {
        &self.settings
    }
}

impl InputSystems<Configured> {
    pub fn create(
        source: Box<dyn InputSource>,
        haptics: HapticsController,
        settings: InputSettings,
    ) -> Self {
        info!("Creating input systems with settings: {:?}", settings);
        let arbiter = InputModeArbiter::new(settings.initial_mode);
        Self::new(source, arbiter, InputUi::new(), haptics, settings)
    }

    /// Enables UI input and starts from the configured initial mode
    pub fn start(mut self) -> InputSystems<Running> {
        self.input_ui.enable();
        self.arbiter.reset(self.settings.initial_mode);
        info!(
            "Input systems started in {} mode",
            self.settings.initial_mode
        );
        self.transition()
    }
}

impl InputSystems<Running> {
    /// Runs one frame: poll devices, relay UI actions, arbitrate the mode
    pub fn tick(&mut self) -> InputMode {
        let activity = self.source.poll_activity();
        if let Some(phase) = activity.cancel {
            self.input_ui.apply(phase);
        }
        self.arbiter.evaluate(&activity)
    }

    pub fn play_vibration(&mut self) -> bool {
        self.haptics.play_vibration()
    }

    pub fn stop_vibration(&mut self) -> bool {
        self.haptics.stop_vibration()
    }

    /// Ticks on the configured interval until `shutdown` is cancelled
    ///
    /// `on_tick` runs after every tick with the resulting mode; it is where
    /// scene logic reacts to input (and may trigger vibration).
    pub async fn run<F>(&mut self, shutdown: CancellationToken, mut on_tick: F)
    where
        F: FnMut(&mut Self, InputMode),
    {
        let period = Duration::from_millis(self.settings.tick_interval_ms.max(1));
        info!("Starting input loop with {:?} interval", period);

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut ticks: u64 = 0;
        let mut last_stats_time = Local::now();
        let stats_interval = chrono::Duration::seconds(30);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let mode = self.tick();
                    on_tick(self, mode);
                    ticks += 1;
                }
                _ = shutdown.cancelled() => {
                    info!("Input loop shutting down");
                    break;
                }
            }

            let now = Local::now();
            if now - last_stats_time > stats_interval {
                let elapsed_seconds = (now - last_stats_time).num_seconds().max(1);
                debug!(
                    "Input loop stats: {} ticks in {} seconds ({:.1}/sec), mode {}",
                    ticks,
                    elapsed_seconds,
                    ticks as f64 / elapsed_seconds as f64,
                    self.arbiter.current()
                );
                ticks = 0;
                last_stats_time = now;
            }
        }
    }

    /// Releases all UI input and stops ticking
    pub fn exit(mut self) -> InputSystems<Exited> {
        info!("Exiting input systems");
        self.input_ui.disable_all();
        self.transition()
    }
}

impl InputSystems<Exited> {
    /// Final teardown; vibration is forced off before returning
    pub fn shutdown(mut self) {
        self.haptics.shutdown();
        info!("Input systems shut down");
    }
}
