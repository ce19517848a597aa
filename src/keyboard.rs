// Keyboard handling module: key events to app actions
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::screen_mode::{InputMode, ScreenMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleInputMode,
    ToggleDebug,
    Analyze,
    NextTab,
    PrevTab,
    Insert(char),
    Newline,
    Backspace,
    DeleteWord,
    ClearInput,
    OpenPicker,
    ClearPdf,
    ScrollDebug(i32),
    None,
}

/// Map a key press to an action for the current screen and input mode.
pub fn action_for(key: &KeyEvent, screen: ScreenMode, mode: InputMode) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global commands that work from ANY screen
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return Action::Quit,
        KeyCode::F(12) => return Action::ToggleDebug,
        _ => {}
    }

    match screen {
        ScreenMode::Debug => debug_action(key),
        ScreenMode::Main => main_action(key, ctrl, mode),
    }
}

fn debug_action(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::ToggleDebug,
        KeyCode::Up => Action::ScrollDebug(-1),
        KeyCode::Down => Action::ScrollDebug(1),
        KeyCode::PageUp => Action::ScrollDebug(-10),
        KeyCode::PageDown => Action::ScrollDebug(10),
        _ => Action::None,
    }
}

fn main_action(key: &KeyEvent, ctrl: bool, mode: InputMode) -> Action {
    match key.code {
        KeyCode::Tab => return Action::ToggleInputMode,
        KeyCode::F(5) => return Action::Analyze,
        KeyCode::Char('r') if ctrl => return Action::Analyze,
        KeyCode::Left => return Action::PrevTab,
        KeyCode::Right => return Action::NextTab,
        _ => {}
    }

    match mode {
        InputMode::PasteText => match key.code {
            KeyCode::Char('u') if ctrl => Action::ClearInput,
            KeyCode::Char('w') if ctrl => Action::DeleteWord,
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => Action::Insert(c),
            KeyCode::Enter => Action::Newline,
            KeyCode::Backspace => Action::Backspace,
            _ => Action::None,
        },
        InputMode::UploadPdf => match key.code {
            KeyCode::Enter => Action::OpenPicker,
            KeyCode::Char('o') if ctrl => Action::OpenPicker,
            KeyCode::Backspace | KeyCode::Delete => Action::ClearPdf,
            KeyCode::Char('1') => Action::PrevTab,
            KeyCode::Char('2') => Action::NextTab,
            _ => Action::None,
        },
    }
}
