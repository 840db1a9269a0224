//! Component trait — the interface both panels implement.
//!
//! - Components own their state and render themselves.
//! - Components produce `Vec<Action>`; they never touch the player directly.
//! - The App dispatches those actions.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::Action;

pub trait Component {
    /// Handle a key event. Returns actions to be dispatched.
    /// Only called on the active view.
    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action>;

    /// Render the component into `area`.
    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool);
}
