use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::{Project, ProjectId, Task, TaskId, User};
use crate::session::SessionToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub country: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
}

/// New tasks carry no status; the service defaults them to "To Do".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
    pub status: String,
}

/// Registration responds with the created profile plus a fresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub token: SessionToken,
    pub user: User,
}

/// One operation per (resource, verb) pair of the remote service. The token
/// is passed in by the caller; this layer never touches the session store or
/// any view state.
#[async_trait]
pub trait TaskTrackerApi: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<RegisteredUser, CoreError>;
    async fn login(&self, request: LoginRequest) -> Result<SessionToken, CoreError>;
    async fn fetch_profile(&self, token: &SessionToken) -> Result<User, CoreError>;
    async fn list_projects(&self, token: &SessionToken) -> Result<Vec<Project>, CoreError>;
    async fn create_project(
        &self,
        token: &SessionToken,
        request: CreateProjectRequest,
    ) -> Result<Project, CoreError>;
    async fn fetch_project(
        &self,
        token: &SessionToken,
        project_id: &ProjectId,
    ) -> Result<Project, CoreError>;
    async fn delete_project(
        &self,
        token: &SessionToken,
        project_id: &ProjectId,
    ) -> Result<(), CoreError>;
    async fn list_tasks(
        &self,
        token: &SessionToken,
        project_id: &ProjectId,
    ) -> Result<Vec<Task>, CoreError>;
    async fn create_task(
        &self,
        token: &SessionToken,
        request: CreateTaskRequest,
    ) -> Result<Task, CoreError>;
    async fn update_task(
        &self,
        token: &SessionToken,
        request: UpdateTaskRequest,
    ) -> Result<Task, CoreError>;
    async fn delete_task(&self, token: &SessionToken, task_id: &TaskId) -> Result<(), CoreError>;
}
