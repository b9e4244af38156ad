//! Domain model and shared contracts for the task tracker client: typed
//! resource schemas, the remote-API trait, the session context, status
//! normalization, and the client error taxonomy.

mod api;
mod error;
mod models;
mod session;
mod status;

pub use api::{
    CreateProjectRequest, CreateTaskRequest, LoginRequest, RegisterRequest, RegisteredUser,
    TaskTrackerApi, UpdateTaskRequest,
};
pub use error::CoreError;
pub use models::{display_date, Project, ProjectId, Task, TaskId, User};
pub use session::{MemorySessionStore, SessionStore, SessionToken};
pub use status::{
    filter_tasks, normalize_status, status_count, TaskStatusFilter, STATUS_COMPLETED,
    STATUS_IN_PROGRESS, STATUS_TO_DO,
};
