//! Terminal setup and teardown, plus the blocking keyboard reader.
//!
//! Raw mode and the alternate screen are held by `TerminalGuard` and released
//! when it drops. The panic hook restores them as well, so a crash never
//! leaves the user's shell in raw mode.

use std::io::{self, Stdout};
use std::time::Duration;

use ratatui::crossterm::{
    cursor::{Hide, Show},
    event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::AppMessage;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// How often the input reader wakes up to check whether the app is gone.
const INPUT_POLL: Duration = Duration::from_millis(100);

pub struct TerminalGuard {
    terminal: Tui,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        debug!("terminal: enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                restore();
                Err(e)
            }
        }
    }

    pub fn terminal_mut(&mut self) -> &mut Tui {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        debug!("terminal: restoring");
        restore();
    }
}

/// Leave raw mode and the alternate screen. Safe to call more than once.
pub fn restore() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

/// Restore the terminal before the default hook prints the panic message.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        default_hook(info);
    }));
}

/// Forward keyboard and resize events into the app's channel until the app
/// drops its receiver or the terminal stops delivering input.
pub fn spawn_input_reader(tx: mpsc::Sender<AppMessage>) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || loop {
        if tx.is_closed() {
            debug!("input reader: app gone");
            break;
        }
        match event::poll(INPUT_POLL) {
            Ok(false) => continue,
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("input reader: read failed: {}", e);
                    break;
                }
            },
            Err(e) => {
                warn!("input reader: poll failed: {}", e);
                break;
            }
        }
    })
}
