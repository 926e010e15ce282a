use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::config::{Keybind, Keybinds};
use crate::metrics::MetricSnapshot;

/// Everything the event loop reacts to. Producers only ever send these.
#[derive(Debug, Clone)]
pub enum Action {
    Tick,
    Resize { width: u16, height: u16 },
    SnapshotReady(MetricSnapshot),
    PollFailed(String),

    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    ScrollTop,
    ScrollBottom,
    FocusNext,

    Quit,
}

impl Action {
    /// Whether the action only moves a selection or focus.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Action::ScrollUp
                | Action::ScrollDown
                | Action::PageUp
                | Action::PageDown
                | Action::HalfPageUp
                | Action::HalfPageDown
                | Action::ScrollTop
                | Action::ScrollBottom
                | Action::FocusNext
        )
    }
}

pub fn matches_keybind(key: &KeyEvent, keybind: &Keybind) -> bool {
    let has_ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let has_shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let has_alt = key.modifiers.contains(KeyModifiers::ALT);

    let expected_ctrl = keybind.modifiers.iter().any(|m| m == "Control");
    let expected_shift = keybind.modifiers.iter().any(|m| m == "Shift");
    let expected_alt = keybind.modifiers.iter().any(|m| m == "Alt");

    if has_ctrl != expected_ctrl || has_alt != expected_alt {
        return false;
    }

    match &keybind.key[..] {
        "Up" => key.code == KeyCode::Up,
        "Down" => key.code == KeyCode::Down,
        "Tab" => key.code == KeyCode::Tab,
        "Esc" => key.code == KeyCode::Esc,
        "Home" => key.code == KeyCode::Home,
        "End" => key.code == KeyCode::End,
        "PageUp" => key.code == KeyCode::PageUp,
        "PageDown" => key.code == KeyCode::PageDown,
        c => match (c.chars().next(), key.code) {
            (Some(ch), KeyCode::Char(input_ch)) => {
                if ch.is_ascii_alphabetic() {
                    // terminals differ on whether shift arrives as a modifier,
                    // an uppercase char, or both
                    let shifted = has_shift || input_ch.is_ascii_uppercase();
                    ch.to_ascii_lowercase() == input_ch.to_ascii_lowercase()
                        && shifted == (expected_shift || ch.is_ascii_uppercase())
                } else {
                    ch == input_ch
                }
            }
            _ => false,
        },
    }
}

fn any_matches(key: &KeyEvent, binds: &[Keybind]) -> bool {
    binds.iter().any(|b| matches_keybind(key, b))
}

/// Convert a key press to an action.
pub fn handle_key_event(key: KeyEvent, keybinds: &Keybinds) -> Option<Action> {
    let table: [(&[Keybind], Action); 10] = [
        (&keybinds.quit, Action::Quit),
        (&keybinds.down, Action::ScrollDown),
        (&keybinds.up, Action::ScrollUp),
        (&keybinds.page_down, Action::PageDown),
        (&keybinds.page_up, Action::PageUp),
        (&keybinds.half_page_down, Action::HalfPageDown),
        (&keybinds.half_page_up, Action::HalfPageUp),
        (&keybinds.top, Action::ScrollTop),
        (&keybinds.bottom, Action::ScrollBottom),
        (&keybinds.focus_next, Action::FocusNext),
    ];
    table
        .into_iter()
        .find(|(binds, _)| any_matches(&key, binds))
        .map(|(_, action)| action)
}
