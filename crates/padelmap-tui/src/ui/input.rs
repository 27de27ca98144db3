//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use padelmap_core::forms::cycle_choice;

use crate::app::{can_add_input_char, App, AppState, Focus, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle the editor
    if matches!(app.state, AppState::Editing) {
        handle_form_input(app, key);
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle delete confirmation
    if matches!(app.state, AppState::ConfirmingDelete) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        }
        return Ok(false);
    }

    // Handle seed confirmation
    if matches!(app.state, AppState::ConfirmingSeed) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_seed(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return Ok(false);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('1') => app.switch_tab(Tab::Map),
        KeyCode::Char('2') => app.switch_tab(Tab::Clubs),
        KeyCode::Char('3') => app.switch_tab(Tab::Communities),
        KeyCode::Left => app.switch_tab(app.current_tab.prev()),
        KeyCode::Right => app.switch_tab(app.current_tab.next()),
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::Up | KeyCode::Char('k') => match app.focus {
            Focus::List => app.move_selection(-1),
            Focus::Detail => app.detail_scroll = app.detail_scroll.saturating_sub(1),
        },
        KeyCode::Down | KeyCode::Char('j') => match app.focus {
            Focus::List => app.move_selection(1),
            Focus::Detail => app.detail_scroll = app.detail_scroll.saturating_add(1),
        },
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Esc => {
            if !app.search_query.is_empty() {
                app.clear_search();
            } else {
                app.focus = Focus::List;
            }
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('r') => app.start_load(),
        KeyCode::Char('a') => app.start_add(),
        KeyCode::Char('e') | KeyCode::Enter => app.start_edit(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('S') => app.request_seed(),
        _ => {}
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.clear_search();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            // Keep search query active
        }
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(c) => app.push_search_char(c),
        _ => {}
    }
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
        app.submit_form();
        return;
    }

    let Some(state) = app.form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };
    let field = state.field;
    let fields = state.form.fields_mut();
    let count = fields.field_count();
    let choices = fields.choices(field);
    let multiline = fields.is_multiline(field);

    match key.code {
        KeyCode::Esc => {
            app.cancel_form();
            return;
        }
        KeyCode::Tab | KeyCode::Down => state.field = (field + 1) % count,
        KeyCode::BackTab | KeyCode::Up => state.field = (field + count - 1) % count,
        KeyCode::Enter if multiline => fields.value_mut(field).push('\n'),
        KeyCode::Enter => state.field = (field + 1) % count,
        KeyCode::Left | KeyCode::Right => {
            if let Some(choices) = choices {
                let value = fields.value_mut(field);
                *value = cycle_choice(value, choices, key.code == KeyCode::Right);
            }
        }
        KeyCode::Backspace => {
            fields.value_mut(field).pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let value = fields.value_mut(field);
            if can_add_input_char(value.len(), c) {
                value.push(c);
            }
        }
        _ => return,
    }

    // Clear a stale validation message once the user edits again
    state.error = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use padelmap_core::{Bundle, Config};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn local_app() -> App {
        App::with_parts(Config::default(), Bundle::embedded().unwrap(), None)
    }

    fn current_value(app: &App) -> String {
        let state = app.form.as_ref().unwrap();
        state.form.fields().value(state.field).to_string()
    }

    #[tokio::test]
    async fn test_quit_requires_confirmation() {
        let mut app = local_app();
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).await.unwrap());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_number_keys_switch_tabs() {
        let mut app = local_app();
        handle_input(&mut app, key(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.current_tab, Tab::Communities);
        handle_input(&mut app, key(KeyCode::Right)).await.unwrap();
        assert_eq!(app.current_tab, Tab::Map);
    }

    #[tokio::test]
    async fn test_typing_into_form_and_cycling_choices() {
        let mut app = local_app();
        app.switch_tab(Tab::Clubs);
        handle_input(&mut app, key(KeyCode::Char('a'))).await.unwrap();
        assert_eq!(app.state, AppState::Editing);

        for c in "New Club".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        assert_eq!(current_value(&app), "New Club");

        // Address, then Zone
        handle_input(&mut app, key(KeyCode::Tab)).await.unwrap();
        handle_input(&mut app, key(KeyCode::Tab)).await.unwrap();
        assert_eq!(current_value(&app), "alquoz");
        handle_input(&mut app, key(KeyCode::Right)).await.unwrap();
        assert_eq!(current_value(&app), "beach");

        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        handle_input(&mut app, save).await.unwrap();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.directory.clubs.iter().any(|c| c.name == "New Club"));
    }

    #[tokio::test]
    async fn test_enter_adds_newline_only_in_multiline_fields() {
        let mut app = local_app();
        app.switch_tab(Tab::Clubs);
        handle_input(&mut app, key(KeyCode::Char('a'))).await.unwrap();

        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.form.as_ref().unwrap().field, 1);

        // Up from the first field wraps to Reviews, the last one
        app.form.as_mut().unwrap().field = 0;
        handle_input(&mut app, key(KeyCode::Up)).await.unwrap();
        handle_input(&mut app, key(KeyCode::Char('x'))).await.unwrap();
        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(current_value(&app), "x\n");
    }

    #[tokio::test]
    async fn test_search_mode_escape_clears_query() {
        let mut app = local_app();
        handle_input(&mut app, key(KeyCode::Char('/'))).await.unwrap();
        handle_input(&mut app, key(KeyCode::Char('z'))).await.unwrap();
        assert_eq!(app.search_query, "z");
        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert!(app.search_query.is_empty());
        assert_eq!(app.state, AppState::Normal);
    }
}
