use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tasktracker_core::{CreateProjectRequest, Project, SessionToken, TaskTrackerApi};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::events::{PageEvent, RoutedPageEvent};
use crate::input::InputField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormField {
    Title,
    Description,
}

#[derive(Debug)]
pub struct ProjectFormState {
    pub title: InputField,
    pub description: InputField,
    pub focus: ProjectFormField,
    pub submitting: bool,
    pub error: Option<String>,
}

impl ProjectFormState {
    pub fn new() -> Self {
        Self {
            title: InputField::new(),
            description: InputField::new(),
            focus: ProjectFormField::Title,
            submitting: false,
            error: None,
        }
    }
}

impl Default for ProjectFormState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum ProjectFormEvent {
    Created(Project),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormIntent {
    None,
    Submit,
    GotoDashboard,
}

pub fn handle_key(state: &mut ProjectFormState, key: KeyEvent) -> ProjectFormIntent {
    match key.code {
        KeyCode::Esc => ProjectFormIntent::GotoDashboard,
        KeyCode::Tab | KeyCode::Down | KeyCode::Up | KeyCode::BackTab => {
            state.focus = match state.focus {
                ProjectFormField::Title => ProjectFormField::Description,
                ProjectFormField::Description => ProjectFormField::Title,
            };
            ProjectFormIntent::None
        }
        KeyCode::Enter if !state.submitting => ProjectFormIntent::Submit,
        KeyCode::Enter => ProjectFormIntent::None,
        _ => {
            let field = match state.focus {
                ProjectFormField::Title => &mut state.title,
                ProjectFormField::Description => &mut state.description,
            };
            field.handle_key(key);
            ProjectFormIntent::None
        }
    }
}

/// Title is the only required field. A blank title produces an inline error
/// and no request.
pub fn begin_submit(state: &mut ProjectFormState) -> Option<CreateProjectRequest> {
    if state.submitting {
        return None;
    }
    if state.title.is_blank() {
        state.error = Some("A project title is required.".to_owned());
        return None;
    }

    state.submitting = true;
    state.error = None;
    Some(CreateProjectRequest {
        title: state.title.value().trim().to_owned(),
        description: state.description.value().trim().to_owned(),
    })
}

pub fn apply_failure(state: &mut ProjectFormState, message: String) {
    state.submitting = false;
    state.error = Some(message);
}

pub fn spawn_submit(
    runtime: &Handle,
    api: Arc<dyn TaskTrackerApi>,
    token: SessionToken,
    request: CreateProjectRequest,
    epoch: u64,
    events: mpsc::Sender<RoutedPageEvent>,
) {
    runtime.spawn(async move {
        let event = match api.create_project(&token, request).await {
            Ok(project) => PageEvent::ProjectForm(ProjectFormEvent::Created(project)),
            Err(error) if error.is_unauthorized() => {
                PageEvent::SessionRejected(error.user_message())
            }
            Err(error) => PageEvent::ProjectForm(ProjectFormEvent::Failed(error.user_message())),
        };
        let _ = events.send(RoutedPageEvent::new(epoch, event)).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn blank_title_blocks_submission() {
        let mut state = ProjectFormState::new();
        state.description = InputField::with_value("has a description but no title");
        assert!(begin_submit(&mut state).is_none());
        assert_eq!(state.error.as_deref(), Some("A project title is required."));
        assert!(!state.submitting);
    }

    #[test]
    fn whitespace_only_title_counts_as_blank() {
        let mut state = ProjectFormState::new();
        state.title = InputField::with_value("   ");
        assert!(begin_submit(&mut state).is_none());
    }

    #[test]
    fn submit_trims_the_title_and_sends_an_empty_description_as_is() {
        let mut state = ProjectFormState::new();
        state.title = InputField::with_value("  Website refresh  ");

        let request = begin_submit(&mut state).expect("request");
        assert_eq!(request.title, "Website refresh");
        assert_eq!(request.description, "");
        assert!(state.submitting);
    }

    #[test]
    fn escape_returns_to_the_dashboard() {
        let mut state = ProjectFormState::new();
        assert_eq!(
            handle_key(&mut state, press(KeyCode::Esc)),
            ProjectFormIntent::GotoDashboard
        );
    }
}
