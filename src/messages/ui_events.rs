//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which screen the current route shows
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ViewKind {
    #[default]
    Home,
    Manga,
    Reader,
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the home search box
    Editing,
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    // Navigation
    Up,
    Down,
    Left,
    Right,
    Select,
    Back,
    Reload,

    // Home
    StartSearch,
    SearchChar(char),
    SearchBackspace,
    /// Run the typed title against the API
    SubmitSearch,
    StopSearch,
    CycleSource,

    // Reader
    FirstPage,
    LastPage,
    ToggleDataSaver,
    /// Digit typed for a page jump; `Select` confirms
    PageDigit(char),

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    view: ViewKind,
    input_mode: InputMode,
    show_help: bool,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    if input_mode == InputMode::Editing {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::StopSearch),
            KeyCode::Enter => Some(UiEvent::SubmitSearch),
            KeyCode::Backspace => Some(UiEvent::SearchBackspace),
            KeyCode::Char(c) => Some(UiEvent::SearchChar(c)),
            _ => None,
        };
    }

    // Keys shared by every view
    match key.code {
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char('?') => return Some(UiEvent::ToggleHelp),
        KeyCode::Char('r') => return Some(UiEvent::Reload),
        KeyCode::Esc | KeyCode::Backspace if view != ViewKind::Home => {
            return Some(UiEvent::Back)
        }
        _ => {}
    }

    match view {
        ViewKind::Home => handle_home_keys(key),
        ViewKind::Manga => handle_manga_keys(key),
        ViewKind::Reader => handle_reader_keys(key),
    }
}

fn handle_home_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('/') | KeyCode::Char('s') => Some(UiEvent::StartSearch),
        KeyCode::Tab | KeyCode::Char('t') => Some(UiEvent::CycleSource),
        KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(UiEvent::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(UiEvent::Right),
        KeyCode::Enter => Some(UiEvent::Select),
        _ => None,
    }
}

fn handle_manga_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::Down),
        KeyCode::Home => Some(UiEvent::FirstPage),
        KeyCode::End => Some(UiEvent::LastPage),
        KeyCode::Enter => Some(UiEvent::Select),
        _ => None,
    }
}

fn handle_reader_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => Some(UiEvent::Left),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => Some(UiEvent::Right),
        KeyCode::Home => Some(UiEvent::FirstPage),
        KeyCode::End => Some(UiEvent::LastPage),
        KeyCode::Char('d') => Some(UiEvent::ToggleDataSaver),
        KeyCode::Char(c) if c.is_ascii_digit() => Some(UiEvent::PageDigit(c)),
        KeyCode::Enter => Some(UiEvent::Select),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_help_swallows_keys() {
        let event = key_to_ui_event(press(KeyCode::Char('q')), ViewKind::Home, InputMode::Normal, true);
        assert_eq!(event, Some(UiEvent::CloseHelp));
    }

    #[test]
    fn test_editing_captures_characters() {
        let event = key_to_ui_event(press(KeyCode::Char('q')), ViewKind::Home, InputMode::Editing, false);
        assert_eq!(event, Some(UiEvent::SearchChar('q')));
        let event = key_to_ui_event(press(KeyCode::Enter), ViewKind::Home, InputMode::Editing, false);
        assert_eq!(event, Some(UiEvent::SubmitSearch));
    }

    #[test]
    fn test_reader_keys() {
        let map = |code| key_to_ui_event(press(code), ViewKind::Reader, InputMode::Normal, false);
        assert_eq!(map(KeyCode::Home), Some(UiEvent::FirstPage));
        assert_eq!(map(KeyCode::End), Some(UiEvent::LastPage));
        assert_eq!(map(KeyCode::Char('7')), Some(UiEvent::PageDigit('7')));
        assert_eq!(map(KeyCode::Esc), Some(UiEvent::Back));
        assert_eq!(map(KeyCode::Char('r')), Some(UiEvent::Reload));
    }

    #[test]
    fn test_escape_on_home_does_nothing() {
        let event = key_to_ui_event(press(KeyCode::Esc), ViewKind::Home, InputMode::Normal, false);
        assert_eq!(event, None);
    }

    #[test]
    fn test_release_events_ignored() {
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert_eq!(key_to_ui_event(key, ViewKind::Home, InputMode::Normal, false), None);
    }
}
