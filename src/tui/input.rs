//! Key binding dispatch for the TUI.
//!
//! Global bindings first (quit, menu, Ctrl+digit navigation), then
//! per-screen handling. Printable characters go to the focused text field.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{
    ArogyaApp, AuthMode, LoginFocus, MenuAction, ProfileFocus, Screen, WellnessFocus,
};

/// Handle a key event, mutating app state.
pub fn handle_key(app: &mut ArogyaApp, key: KeyEvent) {
    // Global bindings
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::F(10) => {
            if app.menu_active {
                app.menu_state.reset();
                app.menu_active = false;
            } else {
                app.menu_state.activate();
                app.menu_active = true;
            }
            return;
        }
        KeyCode::Char('1') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.navigate(if app.user.is_some() {
                Screen::Profile
            } else {
                Screen::Login
            });
            return;
        }
        KeyCode::Char('2') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.navigate(Screen::Wellness);
            return;
        }
        KeyCode::Char('3') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.navigate(Screen::History);
            return;
        }
        _ => {}
    }

    if app.menu_active {
        handle_menu_key(app, key);
        return;
    }

    match app.screen {
        Screen::Home => handle_home_key(app, key),
        Screen::Login => handle_login_key(app, key),
        Screen::Profile => handle_profile_key(app, key),
        Screen::Wellness => handle_wellness_key(app, key),
        Screen::History => handle_history_key(app, key),
    }
}

/// Route keys to the menu bar while it has focus.
fn handle_menu_key(app: &mut ArogyaApp, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.menu_state.reset();
            app.menu_active = false;
            return;
        }
        KeyCode::Up => app.menu_state.up(),
        KeyCode::Down => app.menu_state.down(),
        KeyCode::Left => app.menu_state.left(),
        KeyCode::Right => app.menu_state.right(),
        KeyCode::Enter => app.menu_state.select(),
        _ => {}
    }

    let actions: Vec<MenuAction> = app
        .menu_state
        .drain_events()
        .map(|event| match event {
            tui_menu::MenuEvent::Selected(action) => action,
        })
        .collect();
    for action in actions {
        app.menu_state.reset();
        app.menu_active = false;
        match action {
            MenuAction::Go(screen) => app.navigate(screen),
            MenuAction::Logout => app.logout(),
            MenuAction::Quit => app.should_quit = true,
        }
    }
}

fn handle_home_key(app: &mut ArogyaApp, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.navigate(if app.user.is_some() {
            Screen::Wellness
        } else {
            Screen::Login
        });
    }
}

fn handle_login_key(app: &mut ArogyaApp, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_auth_mode();
        }
        KeyCode::Tab => {
            app.login_focus = match (app.login_focus, app.auth_mode) {
                (LoginFocus::Username, _) => LoginFocus::Password,
                (LoginFocus::Password, AuthMode::Register) => LoginFocus::FullName,
                (LoginFocus::Password, AuthMode::Login) => LoginFocus::Username,
                (LoginFocus::FullName, _) => LoginFocus::Username,
            };
        }
        KeyCode::BackTab => {
            app.login_focus = match (app.login_focus, app.auth_mode) {
                (LoginFocus::Username, AuthMode::Register) => LoginFocus::FullName,
                (LoginFocus::Username, AuthMode::Login) => LoginFocus::Password,
                (LoginFocus::Password, _) => LoginFocus::Username,
                (LoginFocus::FullName, _) => LoginFocus::Password,
            };
        }
        KeyCode::Enter => app.submit_auth(),
        KeyCode::Esc => {
            app.auth_error = None;
            app.auth_info = None;
        }
        _ => edit_focused(app, key),
    }
}

fn handle_profile_key(app: &mut ArogyaApp, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => {
            app.profile_focus = match app.profile_focus {
                ProfileFocus::Height => ProfileFocus::Weight,
                ProfileFocus::Weight => ProfileFocus::Medications,
                ProfileFocus::Medications => ProfileFocus::Height,
            };
        }
        KeyCode::BackTab => {
            app.profile_focus = match app.profile_focus {
                ProfileFocus::Height => ProfileFocus::Medications,
                ProfileFocus::Weight => ProfileFocus::Height,
                ProfileFocus::Medications => ProfileFocus::Weight,
            };
        }
        KeyCode::Enter => app.submit_profile(),
        KeyCode::Esc => app.profile_status = None,
        _ => edit_focused(app, key),
    }
}

fn handle_wellness_key(app: &mut ArogyaApp, key: KeyEvent) {
    match key.code {
        // One-shot (non-streaming) request.
        KeyCode::Char('g') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.submit_guidance(false);
        }
        KeyCode::Tab => {
            app.wellness_focus = match app.wellness_focus {
                WellnessFocus::Symptoms => WellnessFocus::Report,
                WellnessFocus::Report if app.has_guidance() => WellnessFocus::FollowUp,
                WellnessFocus::Report => WellnessFocus::Symptoms,
                WellnessFocus::FollowUp => WellnessFocus::Symptoms,
            };
        }
        KeyCode::BackTab => {
            app.wellness_focus = match app.wellness_focus {
                WellnessFocus::Symptoms if app.has_guidance() => WellnessFocus::FollowUp,
                WellnessFocus::Symptoms => WellnessFocus::Report,
                WellnessFocus::Report => WellnessFocus::Symptoms,
                WellnessFocus::FollowUp => WellnessFocus::Report,
            };
        }
        KeyCode::Enter => {
            if app.wellness_focus == WellnessFocus::FollowUp {
                app.submit_follow_up();
            } else {
                app.submit_guidance(true);
            }
        }
        KeyCode::Up => app.scroll_output_up(),
        KeyCode::Down => app.scroll_output_down(),
        KeyCode::PageUp => {
            app.output_auto_scroll = false;
            app.output_scroll = app.output_scroll.saturating_sub(app.viewport_height);
        }
        KeyCode::PageDown => {
            app.output_auto_scroll = false;
            app.output_scroll = app.output_scroll.saturating_add(app.viewport_height);
        }
        KeyCode::Home => {
            app.output_auto_scroll = false;
            app.output_scroll = 0;
        }
        KeyCode::End => {
            app.output_auto_scroll = true;
        }
        KeyCode::Esc => app.wellness_status = None,
        _ => edit_focused(app, key),
    }
}

fn handle_history_key(app: &mut ArogyaApp, key: KeyEvent) {
    match key.code {
        KeyCode::Up => {
            if app.history_expanded.is_some() {
                app.history_scroll = app.history_scroll.saturating_sub(1);
            } else {
                app.history_up();
            }
        }
        KeyCode::Down => {
            if app.history_expanded.is_some() {
                app.history_scroll = app.history_scroll.saturating_add(1);
            } else {
                app.history_down();
            }
        }
        KeyCode::PageUp => app.history_scroll = app.history_scroll.saturating_sub(10),
        KeyCode::PageDown => app.history_scroll = app.history_scroll.saturating_add(10),
        KeyCode::Enter => app.history_toggle(),
        KeyCode::Esc => {
            app.history_expanded = None;
            app.history_scroll = 0;
        }
        _ => {}
    }
}

/// Printable characters and Backspace edit the focused field.
fn edit_focused(app: &mut ArogyaApp, key: KeyEvent) {
    // Alt chords are reserved; plain and shifted characters type.
    if key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT) {
        return;
    }
    match key.code {
        KeyCode::Char(c) => {
            if let Some(field) = app.focused_field_mut() {
                field.push(c);
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = app.focused_field_mut() {
                field.backspace();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::event::{ApiEvent, AppMessage};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn logged_in_app() -> ArogyaApp {
        let mut app = ArogyaApp::new();
        app.update(AppMessage::Api(ApiEvent::LoginOk {
            user_id: "alice".into(),
            full_name: "Alice Rao".into(),
        }));
        app.profile_completed = true;
        app.take_pending();
        app
    }

    #[test]
    fn typing_fills_focused_login_field() {
        let mut app = ArogyaApp::new();
        app.screen = Screen::Login;
        for c in "bob".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.username.value(), "bob");

        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Char('x')));
        assert_eq!(app.password.value(), "x");
    }

    #[test]
    fn backspace_edits_focused_field() {
        let mut app = ArogyaApp::new();
        app.screen = Screen::Login;
        app.username.set("bobb");
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.username.value(), "bob");
    }

    #[test]
    fn tab_skips_full_name_in_login_mode() {
        let mut app = ArogyaApp::new();
        app.screen = Screen::Login;
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.login_focus, LoginFocus::Password);
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.login_focus, LoginFocus::Username);
    }

    #[test]
    fn tab_reaches_full_name_in_register_mode() {
        let mut app = ArogyaApp::new();
        app.screen = Screen::Login;
        handle_key(&mut app, ctrl('r'));
        assert_eq!(app.auth_mode, AuthMode::Register);
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.login_focus, LoginFocus::FullName);
    }

    #[test]
    fn enter_submits_login() {
        let mut app = ArogyaApp::new();
        app.screen = Screen::Login;
        app.username.set("bob");
        app.password.set("secret");
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.auth_busy);
        assert_eq!(app.take_pending().len(), 1);
    }

    #[test]
    fn ctrl_digit_navigation_respects_guards() {
        let mut app = ArogyaApp::new();
        handle_key(&mut app, ctrl('2'));
        // Not logged in → bounced to Login.
        assert_eq!(app.screen, Screen::Login);
    }

    #[test]
    fn ctrl_digit_navigation_when_logged_in() {
        let mut app = logged_in_app();
        handle_key(&mut app, ctrl('2'));
        assert_eq!(app.screen, Screen::Wellness);
        handle_key(&mut app, ctrl('3'));
        assert_eq!(app.screen, Screen::History);
        handle_key(&mut app, ctrl('1'));
        assert_eq!(app.screen, Screen::Profile);
    }

    #[test]
    fn enter_on_wellness_symptoms_starts_stream() {
        let mut app = logged_in_app();
        app.screen = Screen::Wellness;
        app.symptoms.set("sore throat");
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.session.is_streaming());
    }

    #[test]
    fn ctrl_g_uses_one_shot_endpoint() {
        let mut app = logged_in_app();
        app.screen = Screen::Wellness;
        app.symptoms.set("sore throat");
        handle_key(&mut app, ctrl('g'));
        assert!(app.guidance_busy);
        assert!(!app.session.is_streaming());
    }

    #[test]
    fn wellness_tab_skips_follow_up_without_guidance() {
        let mut app = logged_in_app();
        app.screen = Screen::Wellness;
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.wellness_focus, WellnessFocus::Report);
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.wellness_focus, WellnessFocus::Symptoms);

        app.summary = "guidance".into();
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.wellness_focus, WellnessFocus::FollowUp);
    }

    #[test]
    fn output_scrolling_keys() {
        let mut app = logged_in_app();
        app.screen = Screen::Wellness;
        app.output_scroll = 5;
        handle_key(&mut app, key(KeyCode::Up));
        assert_eq!(app.output_scroll, 4);
        assert!(!app.output_auto_scroll);
        handle_key(&mut app, key(KeyCode::End));
        assert!(app.output_auto_scroll);
        handle_key(&mut app, key(KeyCode::Home));
        assert_eq!(app.output_scroll, 0);
    }

    #[test]
    fn history_keys_select_and_expand() {
        use crate::api::types::HistoryEntry;
        let mut app = logged_in_app();
        app.screen = Screen::History;
        app.history = vec![HistoryEntry::default(), HistoryEntry::default()];

        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(app.history_selected, 1);
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.history_expanded, Some(1));
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.history_expanded.is_none());
    }

    #[test]
    fn f10_toggles_menu_focus() {
        let mut app = ArogyaApp::new();
        handle_key(&mut app, key(KeyCode::F(10)));
        assert!(app.menu_active);
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(!app.menu_active);
    }

    #[test]
    fn typing_ignored_while_menu_active() {
        let mut app = ArogyaApp::new();
        app.screen = Screen::Login;
        handle_key(&mut app, key(KeyCode::F(10)));
        handle_key(&mut app, key(KeyCode::Char('x')));
        assert!(app.username.is_empty());
    }
}
