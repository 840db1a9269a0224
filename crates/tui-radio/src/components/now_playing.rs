//! NowPlaying component — right pane showing the current station and the
//! titles it has announced, newest first.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use radio_core::station::Station;

use crate::{
    action::Action,
    component::Component,
    theme::{style_muted, style_now_playing, style_secondary, style_separator},
    widgets::{pane_chrome::pane_chrome, text::truncate_to_width},
};

/// Station name and the rule under it.
pub const HEADER_ROWS: u16 = 2;
/// The exit-key reminder.
pub const FOOTER_ROWS: u16 = 1;

pub const CURRENT_MARKER: &str = "▶ ";
pub const OLDER_MARKER: &str = "  ";
pub const EXIT_HINT: &str = "q = back to menu";
const WAITING: &str = "waiting for track metadata…";

/// Every title received during one playback session, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleLog {
    entries: Vec<String>,
}

impl TitleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, titles: impl IntoIterator<Item = String>) {
        self.entries.extend(titles);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The `n` most recent titles, newest first.
    pub fn latest(&self, n: usize) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().take(n).map(String::as_str)
    }
}

pub struct NowPlaying {
    station: Station,
    log: TitleLog,
    panel: Rect,
}

impl NowPlaying {
    /// A fresh session with an empty log.
    pub fn new(station: Station, panel: Rect) -> Self {
        Self {
            station,
            log: TitleLog::new(),
            panel,
        }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn log(&self) -> &TitleLog {
        &self.log
    }

    /// Append drained titles in receipt order. Returns whether any arrived.
    pub fn record(&mut self, titles: Vec<String>) -> bool {
        if titles.is_empty() {
            return false;
        }
        self.log.extend(titles);
        true
    }

    /// New panel geometry after a terminal resize. History is kept.
    pub fn resize(&mut self, panel: Rect) {
        self.panel = panel;
    }

    /// How many title rows fit: interior height minus header and footer.
    pub fn visible_rows(&self) -> usize {
        pane_chrome("", true)
            .inner(self.panel)
            .height
            .saturating_sub(HEADER_ROWS + FOOTER_ROWS) as usize
    }

    /// The titles currently on screen, newest first.
    pub fn visible(&self) -> Vec<&str> {
        self.log.latest(self.visible_rows()).collect()
    }
}

impl Component for NowPlaying {
    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Char('q') => vec![Action::Back],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        self.panel = area;
        let block = pane_chrome("Now Playing", focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let width = inner.width as usize;
        let row = |offset: u16| Rect {
            y: inner.y + offset,
            height: 1,
            ..inner
        };

        frame.render_widget(
            Paragraph::new(Span::styled(
                truncate_to_width(&self.station.name, width),
                style_now_playing(),
            )),
            row(0),
        );
        if inner.height > 1 {
            frame.render_widget(
                Paragraph::new(Span::styled("─".repeat(width), style_separator())),
                row(1),
            );
        }

        let rows = self.visible_rows() as u16;
        if rows > 0 {
            let titles_area = Rect {
                y: inner.y + HEADER_ROWS,
                height: rows,
                ..inner
            };
            let lines: Vec<Line> = if self.log.is_empty() {
                vec![Line::from(Span::styled(
                    truncate_to_width(WAITING, width).to_string(),
                    style_muted(),
                ))]
            } else {
                self.visible()
                    .into_iter()
                    .enumerate()
                    .map(|(i, title)| {
                        let (marker, style) = if i == 0 {
                            (CURRENT_MARKER, style_now_playing())
                        } else {
                            (OLDER_MARKER, style_secondary())
                        };
                        let text = format!("{marker}{title}");
                        Line::from(Span::styled(
                            truncate_to_width(&text, width).to_string(),
                            style,
                        ))
                    })
                    .collect()
            };
            frame.render_widget(Paragraph::new(lines), titles_area);
        }

        if inner.height > HEADER_ROWS {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    truncate_to_width(EXIT_HINT, width),
                    style_muted(),
                )),
                row(inner.height - 1),
            );
        }
    }
}
