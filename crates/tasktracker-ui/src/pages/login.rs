use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tasktracker_core::{LoginRequest, SessionToken, TaskTrackerApi};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::events::{PageEvent, RoutedPageEvent};
use crate::input::InputField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub email: InputField,
    pub password: InputField,
    pub focus: LoginField,
    pub submitting: bool,
    pub error: Option<String>,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            email: InputField::new(),
            password: InputField::masked(),
            focus: LoginField::Email,
            submitting: false,
            error: None,
        }
    }
}

impl Default for LoginState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum LoginEvent {
    Succeeded(SessionToken),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginIntent {
    None,
    Submit,
    GotoSignup,
    GotoHome,
}

pub fn handle_key(state: &mut LoginState, key: KeyEvent) -> LoginIntent {
    match key.code {
        KeyCode::Esc => LoginIntent::GotoHome,
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            LoginIntent::GotoSignup
        }
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
            state.focus = match state.focus {
                LoginField::Email => LoginField::Password,
                LoginField::Password => LoginField::Email,
            };
            LoginIntent::None
        }
        // Submit is disabled for the duration of the in-flight request.
        KeyCode::Enter if !state.submitting => LoginIntent::Submit,
        KeyCode::Enter => LoginIntent::None,
        _ => {
            let field = match state.focus {
                LoginField::Email => &mut state.email,
                LoginField::Password => &mut state.password,
            };
            field.handle_key(key);
            LoginIntent::None
        }
    }
}

/// Required-field check before any request is sent; returns the request to
/// submit and marks the form in flight.
pub fn begin_submit(state: &mut LoginState) -> Option<LoginRequest> {
    if state.submitting {
        return None;
    }
    if state.email.is_blank() || state.password.is_blank() {
        state.error = Some("Email and password are required.".to_owned());
        return None;
    }

    state.submitting = true;
    state.error = None;
    Some(LoginRequest {
        email: state.email.value().trim().to_owned(),
        password: state.password.value().to_owned(),
    })
}

pub fn apply_failure(state: &mut LoginState, message: String) {
    state.submitting = false;
    state.error = Some(message);
}

pub fn spawn_submit(
    runtime: &Handle,
    api: Arc<dyn TaskTrackerApi>,
    request: LoginRequest,
    epoch: u64,
    events: mpsc::Sender<RoutedPageEvent>,
) {
    runtime.spawn(async move {
        let event = match api.login(request).await {
            Ok(token) => LoginEvent::Succeeded(token),
            Err(error) => LoginEvent::Failed(error.user_message()),
        };
        let _ = events
            .send(RoutedPageEvent::new(epoch, PageEvent::Login(event)))
            .await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn filled_state() -> LoginState {
        let mut state = LoginState::new();
        state.email = InputField::with_value("dev@example.com");
        state.password = InputField::with_value("hunter2");
        state
    }

    #[test]
    fn blank_fields_block_submission_with_an_inline_error() {
        let mut state = LoginState::new();
        assert!(begin_submit(&mut state).is_none());
        assert_eq!(
            state.error.as_deref(),
            Some("Email and password are required.")
        );
        assert!(!state.submitting);
    }

    #[test]
    fn submit_marks_the_form_in_flight_and_clears_stale_errors() {
        let mut state = filled_state();
        state.error = Some("previous failure".to_owned());

        let request = begin_submit(&mut state).expect("request");
        assert_eq!(request.email, "dev@example.com");
        assert!(state.submitting);
        assert!(state.error.is_none());
    }

    #[test]
    fn enter_is_ignored_while_a_request_is_in_flight() {
        let mut state = filled_state();
        state.submitting = true;
        assert_eq!(handle_key(&mut state, press(KeyCode::Enter)), LoginIntent::None);
        assert!(begin_submit(&mut state).is_none());
    }

    #[test]
    fn failure_re_enables_the_form_and_shows_the_message() {
        let mut state = filled_state();
        state.submitting = true;
        apply_failure(&mut state, "Unauthorized: Invalid email or password.".to_owned());
        assert!(!state.submitting);
        assert_eq!(
            state.error.as_deref(),
            Some("Unauthorized: Invalid email or password.")
        );
    }

    #[test]
    fn tab_toggles_focus_between_fields() {
        let mut state = LoginState::new();
        assert_eq!(state.focus, LoginField::Email);
        handle_key(&mut state, press(KeyCode::Tab));
        assert_eq!(state.focus, LoginField::Password);
        handle_key(&mut state, press(KeyCode::Tab));
        assert_eq!(state.focus, LoginField::Email);
    }
}
