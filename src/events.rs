use crate::app::{App, Focus};
use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Run,
    ForcePredict,
    CheckHealth,
    Quit,
    None,
}

/// Letters go to the ticker field while it has focus; the single-key
/// commands only apply on the options list.
pub fn handle_key_event(app: &mut App, key_code: KeyCode) -> EventAction {
    if app.patch_notes_open {
        if matches!(
            key_code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('N')
        ) {
            app.close_patch_notes();
        }
        return EventAction::None;
    }

    match key_code {
        KeyCode::Esc => EventAction::Quit,
        KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_focus();
            EventAction::None
        }
        KeyCode::Enter if app.focus == Focus::Ticker => EventAction::Run,
        _ if app.focus == Focus::Ticker => {
            match key_code {
                KeyCode::Char(c) => app.push_ticker_char(c),
                KeyCode::Backspace => app.pop_ticker_char(),
                KeyCode::Down => app.focus = Focus::Options,
                _ => {}
            }
            EventAction::None
        }
        KeyCode::Up | KeyCode::Down => {
            let delta = if key_code == KeyCode::Up { -1 } else { 1 };
            app.move_option_cursor(delta);
            EventAction::None
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            app.toggle_selected_option();
            EventAction::None
        }
        KeyCode::Char('j') | KeyCode::Char('J') => {
            app.show_json = !app.show_json;
            EventAction::None
        }
        KeyCode::Char('n') | KeyCode::Char('N') => {
            app.open_patch_notes();
            EventAction::None
        }
        KeyCode::Char('r') | KeyCode::Char('R') => EventAction::Run,
        KeyCode::Char('f') | KeyCode::Char('F') => EventAction::ForcePredict,
        KeyCode::Char('h') | KeyCode::Char('H') => EventAction::CheckHealth,
        KeyCode::Char('q') | KeyCode::Char('Q') => EventAction::Quit,
        _ => EventAction::None,
    }
}
