//! Action enum — intents produced by views and dispatched by the App.

/// All actions that can flow through the system.
/// Views produce Actions; the App dispatches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Enter the playback view for the station at this catalog index.
    Play(usize),
    /// Leave the playback view and return to the menu.
    Back,
    Quit,
}
