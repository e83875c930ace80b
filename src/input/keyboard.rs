use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::source::{ActionPhase, InputSource, TickActivity};

/// Terminal keyboard as an input source
///
/// A background task reads crossterm's `EventStream` and forwards key
/// events; every poll drains whatever arrived since the last tick.
#[derive(Debug)]
pub struct KeyboardMonitor {
    key_receiver: Option<mpsc::UnboundedReceiver<KeyEvent>>,
    task: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl KeyboardMonitor {
    /// Starts reading the terminal. `shutdown` is cancelled on Ctrl+C or `q`
    /// and also stops the reader task.
    pub fn spawn(shutdown: CancellationToken) -> Self {
        info!("Spawning keyboard monitor");
        let (key_sender, key_receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(keyboard_task(key_sender, shutdown.clone()));

        Self {
            key_receiver: Some(key_receiver),
            task: Some(task),
            shutdown,
        }
    }

    /// A keyboard that never reports activity, for non-interactive runs
    pub fn detached(shutdown: CancellationToken) -> Self {
        info!("No interactive terminal, keyboard input disabled");
        Self {
            key_receiver: None,
            task: None,
            shutdown,
        }
    }

    fn handle_key(&self, key: &KeyEvent, activity: &mut TickActivity) {
        if is_quit(key) {
            info!("Quit requested from keyboard");
            self.shutdown.cancel();
        }
        if key.kind == KeyEventKind::Press {
            activity.key_pressed = true;
        }
        if let Some(phase) = cancel_phase(key) {
            debug!("Keyboard cancel: {:?}", phase);
            activity.cancel = Some(phase);
        }
    }
}

impl InputSource for KeyboardMonitor {
    fn poll_activity(&mut self) -> TickActivity {
        let mut activity = TickActivity::idle();
        let mut keys = Vec::new();
        let mut closed = false;

        if let Some(receiver) = self.key_receiver.as_mut() {
            loop {
                match receiver.try_recv() {
                    Ok(key) => keys.push(key),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        debug!("Keyboard channel closed");
                        closed = true;
                        break;
                    }
                }
            }
        }
        if closed {
            self.key_receiver = None;
        }

        for key in &keys {
            self.handle_key(key, &mut activity);
        }
        activity
    }
}

impl Drop for KeyboardMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn keyboard_task(key_sender: mpsc::UnboundedSender<KeyEvent>, shutdown: CancellationToken) {
    let mut event_stream = EventStream::new();

    loop {
        tokio::select! {
            Some(terminal_event) = event_stream.next() => {
                match terminal_event {
                    Ok(Event::Key(key)) => {
                        if key_sender.send(key).is_err() {
                            debug!("Keyboard monitor dropped, stopping reader");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("Terminal event stream failed: {}", e);
                        break;
                    }
                }
            },
            _ = shutdown.cancelled() => break,
        }
    }
}

/// Escape drives the UI cancel action
fn cancel_phase(key: &KeyEvent) -> Option<ActionPhase> {
    if key.code != KeyCode::Esc {
        return None;
    }
    match key.kind {
        KeyEventKind::Press => Some(ActionPhase::Performed),
        KeyEventKind::Release => Some(ActionPhase::Canceled),
        KeyEventKind::Repeat => None,
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') => true,
        _ => false,
    }
}
