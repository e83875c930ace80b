//! Terminal driver for the input and haptics layer.
//!
//! Wires gilrs gamepads and the crossterm keyboard into the frame loop and
//! rumbles on cancel. Trigger contacts come from the physics host, so the
//! danger sensor is only armed here and reports a hit if one is fed to it.

use color_eyre::Result;
use crossterm::terminal;
use repairman::config::{default_config_path, ensure_default_config, SystemConfig};
use repairman::danger::DangerSensor;
use repairman::haptics::{share_device, GilrsRumble, HapticsController};
use repairman::input::{
    init_gilrs, select_active_gamepad, DeviceInputs, GilrsGamepad, InputMode, InputSystems,
    KeyboardMonitor,
};
use std::io::{self, IsTerminal, Write};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config_path = default_config_path();
    if let Err(e) = ensure_default_config(&config_path).await {
        warn!("Could not write default config: {}", e);
    }
    let config = SystemConfig::load(&config_path).await?;

    let shutdown = CancellationToken::new();

    let danger = DangerSensor::from_settings(&config.danger);
    info!("Danger sensor armed for {} tag(s)", config.danger.tags.len());
    let mut hit_rx = danger.subscribe();

    // Gamepads and their rumble share one gilrs context
    let mut inputs = DeviceInputs::new();
    let device = match init_gilrs() {
        Ok(gilrs) => {
            let active = match gilrs.lock() {
                Ok(guard) => select_active_gamepad(&guard),
                Err(e) => {
                    error!("gilrs context unavailable: {}", e);
                    None
                }
            };
            inputs.push(Box::new(GilrsGamepad::new(gilrs.clone())));
            active.map(|id| share_device(Box::new(GilrsRumble::new(gilrs, Some(id)))))
        }
        Err(e) => {
            warn!("Running without gamepad support: {}", e);
            None
        }
    };

    let interactive = io::stdin().is_terminal();
    let keyboard = if interactive {
        terminal::enable_raw_mode()?;
        KeyboardMonitor::spawn(shutdown.clone())
    } else {
        KeyboardMonitor::detached(shutdown.clone())
    };
    inputs.push(Box::new(keyboard));

    let haptics = HapticsController::new(config.haptics.clone(), device);
    let mut systems = InputSystems::create(Box::new(inputs), haptics, config.input.clone()).start();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            signal_shutdown.cancel();
        }
    });

    announce_prompts(systems.current_input_mode());
    let mut mode_rx = systems.subscribe_input_mode();
    let mut cancel_rx = systems.input_ui().subscribe_canceled();

    info!("Press Esc or the East button to rumble, q to quit");
    systems
        .run(shutdown, |systems, _mode| {
            if mode_rx.has_changed().unwrap_or(false) {
                announce_prompts(*mode_rx.borrow_and_update());
            }
            if hit_rx.has_changed().unwrap_or(false) && *hit_rx.borrow_and_update() {
                warn!("Swimmer hit a dangerous body");
            }
            if cancel_rx.has_changed().unwrap_or(false) && *cancel_rx.borrow_and_update() {
                if !systems.play_vibration() {
                    error!("Vibration feedback failed");
                }
            }
        })
        .await;

    systems.exit().shutdown();

    if interactive {
        terminal::disable_raw_mode()?;
    }
    Ok(())
}

/// Stand-in for the prompt views: names the glyph set for the mode
fn announce_prompts(mode: InputMode) {
    let prompts = match mode {
        InputMode::Gamepad => "gamepad glyphs (A confirm / B cancel)",
        InputMode::Keyboard => "keyboard glyphs (Enter confirm / Esc cancel)",
    };
    info!("Input mode {} ({}): showing {}", mode, mode.index(), prompts);
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    debug!("Logging initialized");
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(|| RawModeWriter(io::stderr()))
        .init();
}

/// Raw terminal mode drops the implicit carriage return; put it back
struct RawModeWriter<W: Write>(W);

impl<W: Write> Write for RawModeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut start = 0;
        for (i, byte) in buf.iter().enumerate() {
            if *byte == b'\n' {
                self.0.write_all(&buf[start..i])?;
                self.0.write_all(b"\r\n")?;
                start = i + 1;
            }
        }
        self.0.write_all(&buf[start..])?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
