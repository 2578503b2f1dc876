//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. The caller has already counted the key as
//! session activity.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use acessos_core::view::ViewMode;

use crate::app::{can_add_text_char, can_add_username_char, App, AppState, FormField, LoginFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1)) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
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

    // Keys that work in both panels
    match key.code {
        KeyCode::F(1) => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::F(2) => {
            app.toggle_admin();
            return Ok(false);
        }
        _ => {}
    }

    match app.view {
        ViewMode::AgentView => handle_agent_input(app, key),
        ViewMode::AdminView => handle_admin_input(app, key),
    }
    Ok(false)
}

fn handle_agent_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => {
            app.extension_input.pop();
        }
        KeyCode::Esc => {
            app.extension_input.clear();
            app.lookup_result = None;
        }
        KeyCode::Char('a') | KeyCode::Char('A') => app.start_login(),
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('q') | KeyCode::Char('Q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char(c) => app.push_extension_char(c),
        _ => {}
    }
}

fn handle_admin_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Tab => {
            app.form_focus = app.form_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.form_focus = app.form_focus.prev();
        }
        KeyCode::Enter => {
            if app.form_focus == FormField::Submit {
                app.submit_draft();
            } else {
                app.form_focus = app.form_focus.next();
            }
        }
        KeyCode::Backspace => app.pop_form_char(),
        KeyCode::Char(c) => app.push_form_char(c),
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.cancel_login();
        }
        KeyCode::Down | KeyCode::Tab => {
            // Move to next field
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            // Move to previous field
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                // On success the session transition switches the view
                app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.len(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_text_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}
