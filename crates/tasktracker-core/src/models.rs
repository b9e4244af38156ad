use serde::{Deserialize, Serialize};

/// Identifier of a project as assigned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Profile of the authenticated user. Read-only from the client's
/// perspective; fetched, never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// The service emits Mongo-style `_id` fields; accept both spellings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    #[serde(alias = "_id")]
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Task {
    #[serde(alias = "_id")]
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, rename = "projectId")]
    pub project_id: Option<ProjectId>,
}

/// Date part of an ISO-8601 timestamp, for card footers. The client never
/// does date arithmetic, so the raw string is kept as-is.
pub fn display_date(created_at: Option<&str>) -> &str {
    created_at
        .map(|raw| raw.split('T').next().unwrap_or(raw))
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_decodes_mongo_style_id_and_camel_case_timestamp() {
        let raw = serde_json::json!({
            "_id": "proj-1",
            "title": "Unified inbox",
            "description": "Merge email and chat",
            "createdAt": "2026-04-26T09:30:00.000Z"
        });
        let project: Project = serde_json::from_value(raw).expect("decode project");
        assert_eq!(project.id, ProjectId::new("proj-1"));
        assert_eq!(project.title, "Unified inbox");
        assert_eq!(
            project.created_at.as_deref(),
            Some("2026-04-26T09:30:00.000Z")
        );
    }

    #[test]
    fn task_tolerates_missing_optional_fields() {
        let raw = serde_json::json!({ "id": "task-9", "title": "Write docs" });
        let task: Task = serde_json::from_value(raw).expect("decode task");
        assert_eq!(task.id, TaskId::new("task-9"));
        assert!(task.description.is_none());
        assert!(task.status.is_none());
        assert!(task.project_id.is_none());
    }

    #[test]
    fn task_without_title_is_rejected() {
        let raw = serde_json::json!({ "_id": "task-9" });
        assert!(serde_json::from_value::<Task>(raw).is_err());
    }

    #[test]
    fn display_date_takes_date_part_only() {
        assert_eq!(display_date(Some("2026-04-26T09:30:00.000Z")), "2026-04-26");
        assert_eq!(display_date(Some("2026-04-26")), "2026-04-26");
        assert_eq!(display_date(None), "");
    }
}
