//! Screen geometry: station menu on the left, playback panel on the right.

use ratatui::layout::{Constraint, Layout, Rect};

/// The playback panel needs at least this many columns beyond the menu
/// (including the one-column gutter).
pub const MIN_PLAYBACK_MARGIN: u16 = 10;
/// Border, station name, rule, footer, border: anything shorter has no room
/// for a single title row.
pub const MIN_HEIGHT: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub menu: Rect,
    /// `None` when the terminal is too small for the two-panel layout.
    pub playback: Option<Rect>,
}

pub fn split(area: Rect, menu_width: u16) -> Geometry {
    if area.width < menu_width.saturating_add(MIN_PLAYBACK_MARGIN) || area.height < MIN_HEIGHT {
        return Geometry {
            menu: Rect {
                width: area.width.min(menu_width),
                ..area
            },
            playback: None,
        };
    }

    let [menu, _gutter, playback] = Layout::horizontal([
        Constraint::Length(menu_width),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    Geometry {
        menu,
        playback: Some(playback),
    }
}
