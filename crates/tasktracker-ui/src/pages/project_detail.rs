use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tasktracker_core::{
    filter_tasks, normalize_status, CreateTaskRequest, Project, ProjectId, SessionToken, Task,
    TaskId, TaskStatusFilter, TaskTrackerApi, UpdateTaskRequest, User, STATUS_COMPLETED,
    STATUS_IN_PROGRESS, STATUS_TO_DO,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::events::{PageEvent, RoutedPageEvent};
use crate::input::InputField;

const STATUS_CHOICE_TO_DO: &str = "To Do";
const STATUS_CHOICE_IN_PROGRESS: &str = "In Progress";
const STATUS_CHOICE_COMPLETED: &str = "Completed";

fn canonical_status_choices() -> Vec<String> {
    vec![
        STATUS_CHOICE_TO_DO.to_owned(),
        STATUS_CHOICE_IN_PROGRESS.to_owned(),
        STATUS_CHOICE_COMPLETED.to_owned(),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFormField {
    Title,
    Description,
    Status,
}

#[derive(Debug)]
pub struct TaskFormState {
    /// `Some` when editing an existing task, `None` when creating.
    pub editing: Option<TaskId>,
    pub title: InputField,
    pub description: InputField,
    /// The three canonical statuses, plus the task's own raw status appended
    /// when the service handed us one outside them. The raw string round-trips
    /// unchanged unless the user picks a different choice.
    pub status_choices: Vec<String>,
    pub status_index: usize,
    pub focus: TaskFormField,
    pub submitting: bool,
    pub error: Option<String>,
}

impl TaskFormState {
    pub fn for_create() -> Self {
        Self {
            editing: None,
            title: InputField::new(),
            description: InputField::new(),
            status_choices: canonical_status_choices(),
            status_index: 0,
            focus: TaskFormField::Title,
            submitting: false,
            error: None,
        }
    }

    pub fn for_edit(task: &Task) -> Self {
        let mut status_choices = canonical_status_choices();
        let status_index = match task.status.as_deref() {
            None => 0,
            Some(raw) => match normalize_status(Some(raw)).as_str() {
                STATUS_TO_DO => 0,
                STATUS_IN_PROGRESS => 1,
                STATUS_COMPLETED => 2,
                _ => {
                    status_choices.push(raw.to_owned());
                    status_choices.len() - 1
                }
            },
        };
        Self {
            editing: Some(task.id.clone()),
            title: InputField::with_value(&task.title),
            description: InputField::with_value(task.description.as_deref().unwrap_or("")),
            status_choices,
            status_index,
            focus: TaskFormField::Title,
            submitting: false,
            error: None,
        }
    }

    pub fn status(&self) -> &str {
        self.status_choices
            .get(self.status_index)
            .map(String::as_str)
            .unwrap_or(STATUS_CHOICE_TO_DO)
    }

    fn has_status_field(&self) -> bool {
        self.editing.is_some()
    }

    fn cycle_focus(&mut self) {
        self.focus = match (self.focus, self.has_status_field()) {
            (TaskFormField::Title, _) => TaskFormField::Description,
            (TaskFormField::Description, true) => TaskFormField::Status,
            (TaskFormField::Description, false) => TaskFormField::Title,
            (TaskFormField::Status, _) => TaskFormField::Title,
        };
    }

    fn cycle_status(&mut self, forward: bool) {
        let len = self.status_choices.len();
        if len == 0 {
            return;
        }
        self.status_index = if forward {
            (self.status_index + 1) % len
        } else {
            (self.status_index + len - 1) % len
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDeleteConfirm {
    pub task_id: TaskId,
    pub title: String,
}

#[derive(Debug)]
pub struct ProjectDetailState {
    pub project_id: ProjectId,
    pub user: Option<User>,
    pub project: Option<Project>,
    pub project_loading: bool,
    pub tasks: Vec<Task>,
    pub tasks_loading: bool,
    pub error: Option<String>,
    pub filter: TaskStatusFilter,
    pub selected: usize,
    pub form: Option<TaskFormState>,
    pub confirm_delete: Option<TaskDeleteConfirm>,
    pub deleting: bool,
    pub alert: Option<String>,
}

impl ProjectDetailState {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            user: None,
            project: None,
            project_loading: true,
            tasks: Vec::new(),
            tasks_loading: true,
            error: None,
            filter: TaskStatusFilter::All,
            selected: 0,
            form: None,
            confirm_delete: None,
            deleting: false,
            alert: None,
        }
    }

    /// Tasks matching the active filter, in server order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter_tasks(&self.tasks, &self.filter)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible_tasks().len();
        if self.selected >= visible {
            self.selected = visible.saturating_sub(1);
        }
    }
}

#[derive(Debug)]
pub enum ProjectDetailEvent {
    ProfileLoaded(User),
    ProfileUnavailable(String),
    ProjectLoaded(Project),
    ProjectFailed(String),
    TasksLoaded(Vec<Task>),
    TasksFailed(String),
    TaskSaved,
    TaskSaveFailed(String),
    TaskDeleted(TaskId),
    TaskDeleteFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectDetailIntent {
    None,
    Back,
    Quit,
    SubmitTask,
    DeleteTask(TaskId),
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFormSubmission {
    Create(CreateTaskRequest),
    Update(UpdateTaskRequest),
}

pub fn handle_key(state: &mut ProjectDetailState, key: KeyEvent) -> ProjectDetailIntent {
    if state.alert.is_some() {
        state.alert = None;
        return ProjectDetailIntent::None;
    }

    if let Some(confirm) = state.confirm_delete.clone() {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') if !state.deleting => {
                state.deleting = true;
                ProjectDetailIntent::DeleteTask(confirm.task_id)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc if !state.deleting => {
                state.confirm_delete = None;
                ProjectDetailIntent::None
            }
            _ => ProjectDetailIntent::None,
        };
    }

    if state.form.is_some() {
        if key.code == KeyCode::Esc {
            let submitting = state.form.as_ref().is_some_and(|form| form.submitting);
            if !submitting {
                state.form = None;
            }
            return ProjectDetailIntent::None;
        }
        let Some(form) = state.form.as_mut() else {
            return ProjectDetailIntent::None;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.cycle_focus(),
            KeyCode::Enter if !form.submitting => return ProjectDetailIntent::SubmitTask,
            KeyCode::Left if form.focus == TaskFormField::Status => form.cycle_status(false),
            KeyCode::Right if form.focus == TaskFormField::Status => form.cycle_status(true),
            _ => {
                let field = match form.focus {
                    TaskFormField::Title => &mut form.title,
                    TaskFormField::Description => &mut form.description,
                    TaskFormField::Status => return ProjectDetailIntent::None,
                };
                field.handle_key(key);
            }
        }
        return ProjectDetailIntent::None;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('b') => ProjectDetailIntent::Back,
        KeyCode::Char('q') => ProjectDetailIntent::Quit,
        KeyCode::Char('r') => ProjectDetailIntent::Refresh,
        KeyCode::Char('a') => {
            state.form = Some(TaskFormState::for_create());
            ProjectDetailIntent::None
        }
        KeyCode::Char('e') => {
            if let Some(task) = state.selected_task() {
                state.form = Some(TaskFormState::for_edit(task));
            }
            ProjectDetailIntent::None
        }
        KeyCode::Char('d') => {
            if let Some(task) = state.selected_task() {
                state.confirm_delete = Some(TaskDeleteConfirm {
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                });
            }
            ProjectDetailIntent::None
        }
        KeyCode::Char('f') => {
            state.filter = next_filter(&state.filter);
            state.clamp_selection();
            ProjectDetailIntent::None
        }
        KeyCode::Char(digit @ '1'..='4') => {
            state.filter = match digit {
                '1' => TaskStatusFilter::All,
                '2' => TaskStatusFilter::ToDo,
                '3' => TaskStatusFilter::InProgress,
                _ => TaskStatusFilter::Completed,
            };
            state.clamp_selection();
            ProjectDetailIntent::None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected = state.selected.saturating_sub(1);
            ProjectDetailIntent::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.selected + 1 < state.visible_tasks().len() {
                state.selected += 1;
            }
            ProjectDetailIntent::None
        }
        _ => ProjectDetailIntent::None,
    }
}

fn next_filter(filter: &TaskStatusFilter) -> TaskStatusFilter {
    match filter {
        TaskStatusFilter::All => TaskStatusFilter::ToDo,
        TaskStatusFilter::ToDo => TaskStatusFilter::InProgress,
        TaskStatusFilter::InProgress => TaskStatusFilter::Completed,
        TaskStatusFilter::Completed | TaskStatusFilter::Custom(_) => TaskStatusFilter::All,
    }
}

/// Validates the open form. A blank title keeps the form open with an inline
/// error and produces no request.
pub fn validate_and_begin_submit(state: &mut ProjectDetailState) -> Option<TaskFormSubmission> {
    let project_id = state.project_id.clone();
    let form = state.form.as_mut()?;
    if form.submitting {
        return None;
    }
    if form.title.is_blank() {
        form.error = Some("A task title is required.".to_owned());
        return None;
    }

    form.submitting = true;
    form.error = None;
    let title = form.title.value().trim().to_owned();
    let description = form.description.value().trim().to_owned();

    Some(match form.editing.clone() {
        Some(task_id) => TaskFormSubmission::Update(UpdateTaskRequest {
            task_id,
            title,
            description,
            status: form.status().to_owned(),
        }),
        None => TaskFormSubmission::Create(CreateTaskRequest {
            project_id,
            title,
            description,
        }),
    })
}

pub fn apply(state: &mut ProjectDetailState, event: ProjectDetailEvent) {
    match event {
        ProjectDetailEvent::ProfileLoaded(user) => {
            state.user = Some(user);
        }
        ProjectDetailEvent::ProfileUnavailable(message) => {
            tracing::warn!(%message, "profile fetch failed");
        }
        ProjectDetailEvent::ProjectLoaded(project) => {
            state.project_loading = false;
            state.project = Some(project);
        }
        ProjectDetailEvent::ProjectFailed(message) => {
            state.project_loading = false;
            state.error = Some(message);
        }
        ProjectDetailEvent::TasksLoaded(tasks) => {
            state.tasks_loading = false;
            state.tasks = tasks;
            state.clamp_selection();
        }
        ProjectDetailEvent::TasksFailed(message) => {
            state.tasks_loading = false;
            state.error = Some(message);
        }
        ProjectDetailEvent::TaskSaved => {
            state.form = None;
            state.tasks_loading = true;
        }
        ProjectDetailEvent::TaskSaveFailed(message) => {
            if let Some(form) = state.form.as_mut() {
                form.submitting = false;
                form.error = Some(message);
            }
        }
        ProjectDetailEvent::TaskDeleted(task_id) => {
            state.tasks.retain(|task| task.id != task_id);
            state.confirm_delete = None;
            state.deleting = false;
            state.clamp_selection();
        }
        ProjectDetailEvent::TaskDeleteFailed(message) => {
            state.deleting = false;
            state.alert = Some(message);
        }
    }
}

pub fn spawn_load(
    runtime: &Handle,
    api: Arc<dyn TaskTrackerApi>,
    token: SessionToken,
    project_id: ProjectId,
    epoch: u64,
    events: mpsc::Sender<RoutedPageEvent>,
) {
    let profile_api = Arc::clone(&api);
    let profile_token = token.clone();
    let profile_events = events.clone();
    runtime.spawn(async move {
        let event = match profile_api.fetch_profile(&profile_token).await {
            Ok(user) => PageEvent::ProjectDetail(ProjectDetailEvent::ProfileLoaded(user)),
            Err(error) if error.is_unauthorized() => {
                PageEvent::SessionRejected(error.user_message())
            }
            Err(error) => PageEvent::ProjectDetail(ProjectDetailEvent::ProfileUnavailable(
                error.user_message(),
            )),
        };
        let _ = profile_events
            .send(RoutedPageEvent::new(epoch, event))
            .await;
    });

    let project_api = Arc::clone(&api);
    let project_token = token.clone();
    let project_events = events.clone();
    let project_fetch_id = project_id.clone();
    runtime.spawn(async move {
        let event = match project_api
            .fetch_project(&project_token, &project_fetch_id)
            .await
        {
            Ok(project) => PageEvent::ProjectDetail(ProjectDetailEvent::ProjectLoaded(project)),
            Err(error) if error.is_unauthorized() => {
                PageEvent::SessionRejected(error.user_message())
            }
            Err(error) => {
                PageEvent::ProjectDetail(ProjectDetailEvent::ProjectFailed(error.user_message()))
            }
        };
        let _ = project_events
            .send(RoutedPageEvent::new(epoch, event))
            .await;
    });

    runtime.spawn(async move {
        let event = tasks_event(api.list_tasks(&token, &project_id).await);
        let _ = events.send(RoutedPageEvent::new(epoch, event)).await;
    });
}

pub fn spawn_save_task(
    runtime: &Handle,
    api: Arc<dyn TaskTrackerApi>,
    token: SessionToken,
    project_id: ProjectId,
    submission: TaskFormSubmission,
    epoch: u64,
    events: mpsc::Sender<RoutedPageEvent>,
) {
    runtime.spawn(async move {
        let saved = match submission {
            TaskFormSubmission::Create(request) => {
                api.create_task(&token, request).await.map(|_| ())
            }
            TaskFormSubmission::Update(request) => {
                api.update_task(&token, request).await.map(|_| ())
            }
        };

        match saved {
            Ok(()) => {
                let event = PageEvent::ProjectDetail(ProjectDetailEvent::TaskSaved);
                let _ = events.send(RoutedPageEvent::new(epoch, event)).await;
                // The server response omits the list, so reload it.
                let event = tasks_event(api.list_tasks(&token, &project_id).await);
                let _ = events.send(RoutedPageEvent::new(epoch, event)).await;
            }
            Err(error) if error.is_unauthorized() => {
                let event = PageEvent::SessionRejected(error.user_message());
                let _ = events.send(RoutedPageEvent::new(epoch, event)).await;
            }
            Err(error) => {
                let event = PageEvent::ProjectDetail(ProjectDetailEvent::TaskSaveFailed(
                    error.user_message(),
                ));
                let _ = events.send(RoutedPageEvent::new(epoch, event)).await;
            }
        }
    });
}

pub fn spawn_delete_task(
    runtime: &Handle,
    api: Arc<dyn TaskTrackerApi>,
    token: SessionToken,
    task_id: TaskId,
    epoch: u64,
    events: mpsc::Sender<RoutedPageEvent>,
) {
    runtime.spawn(async move {
        let event = match api.delete_task(&token, &task_id).await {
            Ok(()) => PageEvent::ProjectDetail(ProjectDetailEvent::TaskDeleted(task_id)),
            Err(error) if error.is_unauthorized() => {
                PageEvent::SessionRejected(error.user_message())
            }
            Err(error) => PageEvent::ProjectDetail(ProjectDetailEvent::TaskDeleteFailed(
                error.user_message(),
            )),
        };
        let _ = events.send(RoutedPageEvent::new(epoch, event)).await;
    });
}

fn tasks_event(result: Result<Vec<Task>, tasktracker_core::CoreError>) -> PageEvent {
    match result {
        Ok(tasks) => PageEvent::ProjectDetail(ProjectDetailEvent::TasksLoaded(tasks)),
        Err(error) if error.is_unauthorized() => PageEvent::SessionRejected(error.user_message()),
        Err(error) => {
            PageEvent::ProjectDetail(ProjectDetailEvent::TasksFailed(error.user_message()))
        }
    }
}
