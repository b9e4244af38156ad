use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tasktracker_core::{RegisterRequest, RegisteredUser, TaskTrackerApi};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::events::{PageEvent, RoutedPageEvent};
use crate::input::InputField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupField {
    Name,
    Email,
    Country,
    Password,
}

impl SignupField {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::Email,
            Self::Email => Self::Country,
            Self::Country => Self::Password,
            Self::Password => Self::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Name => Self::Password,
            Self::Email => Self::Name,
            Self::Country => Self::Email,
            Self::Password => Self::Country,
        }
    }
}

#[derive(Debug)]
pub struct SignupState {
    pub name: InputField,
    pub email: InputField,
    pub country: InputField,
    pub password: InputField,
    pub focus: SignupField,
    pub submitting: bool,
    pub error: Option<String>,
}

impl SignupState {
    pub fn new() -> Self {
        Self {
            name: InputField::new(),
            email: InputField::new(),
            country: InputField::new(),
            password: InputField::masked(),
            focus: SignupField::Name,
            submitting: false,
            error: None,
        }
    }
}

impl Default for SignupState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum SignupEvent {
    Succeeded(RegisteredUser),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupIntent {
    None,
    Submit,
    GotoLogin,
    GotoHome,
}

pub fn handle_key(state: &mut SignupState, key: KeyEvent) -> SignupIntent {
    match key.code {
        KeyCode::Esc => SignupIntent::GotoHome,
        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SignupIntent::GotoLogin
        }
        KeyCode::Tab | KeyCode::Down => {
            state.focus = state.focus.next();
            SignupIntent::None
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.focus = state.focus.previous();
            SignupIntent::None
        }
        KeyCode::Enter if !state.submitting => SignupIntent::Submit,
        KeyCode::Enter => SignupIntent::None,
        _ => {
            let field = match state.focus {
                SignupField::Name => &mut state.name,
                SignupField::Email => &mut state.email,
                SignupField::Country => &mut state.country,
                SignupField::Password => &mut state.password,
            };
            field.handle_key(key);
            SignupIntent::None
        }
    }
}

/// Country is optional; everything else is required before a request goes out.
pub fn begin_submit(state: &mut SignupState) -> Option<RegisterRequest> {
    if state.submitting {
        return None;
    }
    if state.name.is_blank() || state.email.is_blank() || state.password.is_blank() {
        state.error = Some("Name, email, and password are required.".to_owned());
        return None;
    }

    state.submitting = true;
    state.error = None;
    Some(RegisterRequest {
        name: state.name.value().trim().to_owned(),
        email: state.email.value().trim().to_owned(),
        country: state.country.value().trim().to_owned(),
        password: state.password.value().to_owned(),
    })
}

pub fn apply_failure(state: &mut SignupState, message: String) {
    state.submitting = false;
    state.error = Some(message);
}

pub fn spawn_submit(
    runtime: &Handle,
    api: Arc<dyn TaskTrackerApi>,
    request: RegisterRequest,
    epoch: u64,
    events: mpsc::Sender<RoutedPageEvent>,
) {
    runtime.spawn(async move {
        let event = match api.register(request).await {
            Ok(registered) => SignupEvent::Succeeded(registered),
            Err(error) => SignupEvent::Failed(error.user_message()),
        };
        let _ = events
            .send(RoutedPageEvent::new(epoch, PageEvent::Signup(event)))
            .await;
    });
}
