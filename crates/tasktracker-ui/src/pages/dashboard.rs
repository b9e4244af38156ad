use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tasktracker_core::{Project, ProjectId, SessionToken, TaskTrackerApi, User};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::events::{PageEvent, RoutedPageEvent};

#[derive(Debug)]
pub struct DashboardState {
    pub loading: bool,
    pub user: Option<User>,
    pub projects: Vec<Project>,
    pub selected: usize,
    pub error: Option<String>,
    pub confirm_delete: Option<ProjectId>,
    pub mutating: bool,
    pub alert: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            loading: true,
            user: None,
            projects: Vec::new(),
            selected: 0,
            error: None,
            confirm_delete: None,
            mutating: false,
            alert: None,
        }
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects.get(self.selected)
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum DashboardEvent {
    ProfileLoaded(User),
    ProfileUnavailable(String),
    ProjectsLoaded(Vec<Project>),
    ProjectsFailed(String),
    DeleteDone(ProjectId),
    DeleteFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardIntent {
    None,
    OpenProject(ProjectId),
    NewProject,
    DeleteProject(ProjectId),
    Refresh,
    Logout,
    Quit,
}

pub fn handle_key(state: &mut DashboardState, key: KeyEvent) -> DashboardIntent {
    if state.alert.is_some() {
        state.alert = None;
        return DashboardIntent::None;
    }

    if let Some(project_id) = state.confirm_delete.clone() {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') if !state.mutating => {
                state.mutating = true;
                DashboardIntent::DeleteProject(project_id)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc if !state.mutating => {
                state.confirm_delete = None;
                DashboardIntent::None
            }
            _ => DashboardIntent::None,
        };
    }

    match key.code {
        KeyCode::Char('q') => DashboardIntent::Quit,
        KeyCode::Char('l') => DashboardIntent::Logout,
        KeyCode::Char('n') => DashboardIntent::NewProject,
        KeyCode::Char('r') => DashboardIntent::Refresh,
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected = state.selected.saturating_sub(1);
            DashboardIntent::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.selected + 1 < state.projects.len() {
                state.selected += 1;
            }
            DashboardIntent::None
        }
        KeyCode::Enter => match state.selected_project() {
            Some(project) => DashboardIntent::OpenProject(project.id.clone()),
            None => DashboardIntent::None,
        },
        KeyCode::Char('d') => {
            if let Some(project) = state.selected_project() {
                state.confirm_delete = Some(project.id.clone());
            }
            DashboardIntent::None
        }
        _ => DashboardIntent::None,
    }
}

pub fn apply(state: &mut DashboardState, event: DashboardEvent) {
    match event {
        DashboardEvent::ProfileLoaded(user) => {
            state.user = Some(user);
        }
        DashboardEvent::ProfileUnavailable(message) => {
            // The greeting is decoration; the project list stands on its own.
            tracing::warn!(%message, "profile fetch failed");
        }
        DashboardEvent::ProjectsLoaded(projects) => {
            state.loading = false;
            state.error = None;
            if state.selected >= projects.len() {
                state.selected = projects.len().saturating_sub(1);
            }
            state.projects = projects;
        }
        DashboardEvent::ProjectsFailed(message) => {
            state.loading = false;
            state.error = Some(message);
        }
        DashboardEvent::DeleteDone(project_id) => {
            state.projects.retain(|project| project.id != project_id);
            if state.selected >= state.projects.len() {
                state.selected = state.projects.len().saturating_sub(1);
            }
            state.confirm_delete = None;
            state.mutating = false;
        }
        DashboardEvent::DeleteFailed(message) => {
            state.confirm_delete = None;
            state.mutating = false;
            state.alert = Some(message);
        }
    }
}

/// Profile first, then the project list, on one task so the two resolve in
/// issuance order.
pub fn spawn_load(
    runtime: &Handle,
    api: Arc<dyn TaskTrackerApi>,
    token: SessionToken,
    epoch: u64,
    events: mpsc::Sender<RoutedPageEvent>,
) {
    runtime.spawn(async move {
        let event = match api.fetch_profile(&token).await {
            Ok(user) => PageEvent::Dashboard(DashboardEvent::ProfileLoaded(user)),
            Err(error) if error.is_unauthorized() => {
                let _ = events
                    .send(RoutedPageEvent::new(
                        epoch,
                        PageEvent::SessionRejected(error.user_message()),
                    ))
                    .await;
                return;
            }
            Err(error) => {
                PageEvent::Dashboard(DashboardEvent::ProfileUnavailable(error.user_message()))
            }
        };
        let _ = events.send(RoutedPageEvent::new(epoch, event)).await;

        let event = match api.list_projects(&token).await {
            Ok(projects) => PageEvent::Dashboard(DashboardEvent::ProjectsLoaded(projects)),
            Err(error) if error.is_unauthorized() => {
                PageEvent::SessionRejected(error.user_message())
            }
            Err(error) => {
                PageEvent::Dashboard(DashboardEvent::ProjectsFailed(error.user_message()))
            }
        };
        let _ = events.send(RoutedPageEvent::new(epoch, event)).await;
    });
}

pub fn spawn_delete(
    runtime: &Handle,
    api: Arc<dyn TaskTrackerApi>,
    token: SessionToken,
    project_id: ProjectId,
    epoch: u64,
    events: mpsc::Sender<RoutedPageEvent>,
) {
    runtime.spawn(async move {
        let event = match api.delete_project(&token, &project_id).await {
            Ok(()) => PageEvent::Dashboard(DashboardEvent::DeleteDone(project_id)),
            Err(error) if error.is_unauthorized() => {
                PageEvent::SessionRejected(error.user_message())
            }
            Err(error) => PageEvent::Dashboard(DashboardEvent::DeleteFailed(error.user_message())),
        };
        let _ = events.send(RoutedPageEvent::new(epoch, event)).await;
    });
}
