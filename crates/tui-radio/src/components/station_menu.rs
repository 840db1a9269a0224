//! StationMenu component — left pane listing the station catalog.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    widgets::{List, ListItem, ListState},
    Frame,
};

use radio_core::station::Station;

use crate::{
    action::Action,
    component::Component,
    theme::{style_default, style_selected},
    widgets::{pane_chrome::pane_chrome, text::truncate_to_width},
};

pub struct StationMenu {
    stations: Vec<Station>,
    selected: usize,
    list_state: ListState,
}

impl StationMenu {
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            stations,
            selected: 0,
            list_state: ListState::default(),
        }
    }

    #[cfg(test)]
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn station(&self, idx: usize) -> Option<&Station> {
        self.stations.get(idx)
    }

    /// Move up one row, wrapping from the first station to the last.
    pub fn select_up(&mut self) {
        let n = self.stations.len();
        if n == 0 {
            return;
        }
        self.selected = (self.selected + n - 1) % n;
    }

    /// Move down one row, wrapping from the last station to the first.
    pub fn select_down(&mut self) {
        let n = self.stations.len();
        if n == 0 {
            return;
        }
        self.selected = (self.selected + 1) % n;
    }
}

impl Component for StationMenu {
    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_up(),
            KeyCode::Down | KeyCode::Char('j') => self.select_down(),
            KeyCode::Enter if !self.stations.is_empty() => return vec![Action::Play(self.selected)],
            KeyCode::Char('q') => return vec![Action::Quit],
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let block = pane_chrome("Stations", focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // One blank row under the top border before the first station.
        let rows = Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(1),
            ..inner
        };
        let width = rows.width as usize;
        let items: Vec<ListItem> = self
            .stations
            .iter()
            .map(|s| ListItem::new(truncate_to_width(&s.name, width)).style(style_default()))
            .collect();

        self.list_state.select(Some(self.selected));
        let list = List::new(items).highlight_style(style_selected());
        frame.render_stateful_widget(list, rows, &mut self.list_state);
    }
}
