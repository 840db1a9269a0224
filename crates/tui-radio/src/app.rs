//! App — top-level state machine alternating between the station menu and
//! the playback view.
//!
//! Architecture:
//! - Keyboard and resize events arrive on an `mpsc` channel fed by the
//!   blocking input reader (see `terminal::spawn_input_reader`).
//! - A 100ms `ui_tick` drains the title channel into the playback view.
//! - Views return `Vec<Action>`; the App dispatches each Action.
//! - The player supervisor is only touched here, at view transitions.

use std::time::Duration;

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, layout::Rect, Frame, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use radio_core::config::Config;
use radio_core::launch::LaunchSpec;

use crate::{
    action::Action,
    component::Component,
    components::{now_playing::NowPlaying, station_menu::StationMenu},
    events::EventChannel,
    layout,
    player::{PlayerError, PlayerSupervisor},
};

// ── Internal event bus ────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
}

/// Which view is active. Transitions replace the value outright.
pub enum ViewState {
    Menu,
    Playback(NowPlaying),
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    menu: StationMenu,
    view: ViewState,
    supervisor: PlayerSupervisor,
    events: EventChannel,
    menu_width: u16,
    tick: Duration,
    /// Last known terminal size.
    area: Rect,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config, launch: LaunchSpec) -> Self {
        Self {
            menu: StationMenu::new(config.stations.clone()),
            view: ViewState::Menu,
            supervisor: PlayerSupervisor::new(launch, config.player.stop_timeout()),
            events: EventChannel::new(),
            menu_width: config.ui.menu_width,
            tick: config.ui.tick(),
            area: Rect::default(),
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run<B: Backend>(
        mut self,
        terminal: &mut Terminal<B>,
        mut rx: mpsc::Receiver<AppMessage>,
    ) -> anyhow::Result<()> {
        let size = terminal
            .size()
            .map_err(|e| anyhow::anyhow!("failed to query terminal size: {}", e))?;
        self.area = Rect::new(0, 0, size.width, size.height);
        debug!("run(): terminal size {}x{}", size.width, size.height);

        let result = self.event_loop(terminal, &mut rx).await;

        // Whatever ended the loop, no player outlives it.
        self.supervisor.stop().await;
        result
    }

    async fn event_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        rx: &mut mpsc::Receiver<AppMessage>,
    ) -> anyhow::Result<()> {
        let mut ui_tick = tokio::time::interval(self.tick);
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| anyhow::anyhow!("terminal draw failed: {}", e))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(msg) => needs_redraw = self.handle_message(msg).await?,
                    None => {
                        warn!("input closed, quitting");
                        self.quit().await;
                    }
                },
                _ = ui_tick.tick() => {
                    needs_redraw = self.on_tick();
                }
            }
        }
        info!("app: quit");
        Ok(())
    }

    /// Returns whether the screen needs redrawing.
    async fn handle_message(&mut self, msg: AppMessage) -> anyhow::Result<bool> {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                for action in self.handle_key(key) {
                    self.apply_action(action).await?;
                }
                Ok(true)
            }
            AppMessage::Event(Event::Resize(w, h)) => {
                self.resize(Rect::new(0, 0, w, h)).await;
                Ok(true)
            }
            AppMessage::Event(_) => Ok(false),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        // Raw mode swallows SIGINT, so Ctrl-C is handled as a key.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }
        match &mut self.view {
            ViewState::Menu => self.menu.handle_key(key),
            ViewState::Playback(view) => view.handle_key(key),
        }
    }

    async fn apply_action(&mut self, action: Action) -> Result<(), PlayerError> {
        debug!("apply_action: {:?}", action);
        match action {
            Action::Play(idx) => self.enter_playback(idx).await?,
            Action::Back => self.leave_playback().await,
            Action::Quit => self.quit().await,
        }
        Ok(())
    }

    /// Drain new titles into the playback view. Returns whether any arrived.
    fn on_tick(&mut self) -> bool {
        let ViewState::Playback(view) = &mut self.view else {
            return false;
        };
        let titles = self.events.drain_available();
        if !titles.is_empty() {
            debug!("tick: {} new titles", titles.len());
        }
        view.record(titles)
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    async fn enter_playback(&mut self, idx: usize) -> Result<(), PlayerError> {
        let Some(station) = self.menu.station(idx).cloned() else {
            warn!("enter_playback: no station at index {}", idx);
            return Ok(());
        };
        let Some(panel) = layout::split(self.area, self.menu_width).playback else {
            info!(
                "terminal {}x{} too small for playback, staying in menu",
                self.area.width, self.area.height
            );
            return Ok(());
        };

        // The previous reader is fully joined before the channel is cleared,
        // so nothing from the old stream can reach the new session.
        if let Some(url) = self.supervisor.current_url() {
            debug!("enter_playback: replacing {}", url);
        }
        self.supervisor.stop().await;
        let stale = self.events.clear();
        if stale > 0 {
            debug!("enter_playback: discarded {} stale titles", stale);
        }

        self.supervisor
            .start(&station.url, self.events.sender())
            .await?;
        info!("playback: {} ({})", station.name, station.url);
        self.view = ViewState::Playback(NowPlaying::new(station, panel));
        Ok(())
    }

    async fn leave_playback(&mut self) {
        if let ViewState::Playback(view) = &self.view {
            info!(
                "playback: leaving {} after {} titles",
                view.station().name,
                view.log().len()
            );
        }
        self.supervisor.stop().await;
        self.events.clear();
        self.view = ViewState::Menu;
    }

    async fn quit(&mut self) {
        if self.supervisor.is_running() {
            info!("quit: stopping player");
        }
        self.supervisor.stop().await;
        self.should_quit = true;
    }

    async fn resize(&mut self, area: Rect) {
        self.area = area;
        let panel = layout::split(area, self.menu_width).playback;
        let ViewState::Playback(view) = &mut self.view else {
            return;
        };
        match panel {
            Some(panel) => view.resize(panel),
            None => {
                info!(
                    "terminal resized to {}x{}, too small for playback",
                    area.width, area.height
                );
                self.leave_playback().await;
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let geometry = layout::split(frame.area(), self.menu_width);
        let in_menu = matches!(self.view, ViewState::Menu);
        self.menu.draw(frame, geometry.menu, in_menu);
        if let (ViewState::Playback(view), Some(panel)) = (&mut self.view, geometry.playback) {
            view.draw(frame, panel, true);
        }
    }
}
