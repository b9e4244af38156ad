use crate::models::Task;

pub const STATUS_TO_DO: &str = "to-do";
pub const STATUS_IN_PROGRESS: &str = "in-progress";
pub const STATUS_COMPLETED: &str = "completed";

/// Maps free-form status text onto one of the canonical filter buckets.
///
/// Case-insensitive, synonym-aware, and idempotent: applying it to its own
/// output yields the same string. Unrecognized statuses keep their lowercased
/// form so a custom server status still round-trips through filtering.
pub fn normalize_status(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return STATUS_TO_DO.to_owned();
    };

    let lowered = raw.to_lowercase();
    match lowered.as_str() {
        "to do" | STATUS_TO_DO => STATUS_TO_DO.to_owned(),
        "in process" | "in progress" | STATUS_IN_PROGRESS => STATUS_IN_PROGRESS.to_owned(),
        "done" | STATUS_COMPLETED => STATUS_COMPLETED.to_owned(),
        _ => lowered,
    }
}

/// Selector for the client-side task filter. `Custom` passes through any
/// unrecognized (already normalized) status key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatusFilter {
    All,
    ToDo,
    InProgress,
    Completed,
    Custom(String),
}

impl TaskStatusFilter {
    pub fn from_key(key: &str) -> Self {
        match key {
            "all" => TaskStatusFilter::All,
            STATUS_TO_DO => TaskStatusFilter::ToDo,
            STATUS_IN_PROGRESS => TaskStatusFilter::InProgress,
            STATUS_COMPLETED => TaskStatusFilter::Completed,
            other => TaskStatusFilter::Custom(normalize_status(Some(other))),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            TaskStatusFilter::All => "all",
            TaskStatusFilter::ToDo => STATUS_TO_DO,
            TaskStatusFilter::InProgress => STATUS_IN_PROGRESS,
            TaskStatusFilter::Completed => STATUS_COMPLETED,
            TaskStatusFilter::Custom(key) => key.as_str(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TaskStatusFilter::All => "All",
            TaskStatusFilter::ToDo => "To Do",
            TaskStatusFilter::InProgress => "In Progress",
            TaskStatusFilter::Completed => "Completed",
            TaskStatusFilter::Custom(key) => key.as_str(),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskStatusFilter::All => true,
            _ => normalize_status(task.status.as_deref()) == self.key(),
        }
    }
}

/// Filters without reordering; `All` returns the full list unchanged.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskStatusFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

pub fn status_count(tasks: &[Task], filter: &TaskStatusFilter) -> usize {
    tasks.iter().filter(|task| filter.matches(task)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskId;

    fn task(id: &str, status: Option<&str>) -> Task {
        Task {
            id: TaskId::new(id),
            title: format!("task {id}"),
            description: None,
            status: status.map(ToOwned::to_owned),
            created_at: None,
            project_id: None,
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [
            "To Do", "to do", "IN PROCESS", "In Progress", "Done", "Completed", "Blocked",
            "waiting on QA", "", "to-do",
        ] {
            let once = normalize_status(Some(raw));
            let twice = normalize_status(Some(once.as_str()));
            assert_eq!(once, twice, "normalization of {raw:?} must be idempotent");
        }
        assert_eq!(normalize_status(None), normalize_status(Some("to-do")));
    }

    #[test]
    fn synonyms_map_to_distinct_buckets() {
        assert_eq!(normalize_status(Some("To Do")), "to-do");
        assert_eq!(normalize_status(Some("to do")), "to-do");
        assert_eq!(normalize_status(Some("In Process")), "in-progress");
        assert_eq!(normalize_status(Some("in progress")), "in-progress");
        assert_eq!(normalize_status(Some("Done")), "completed");
        assert_eq!(normalize_status(Some("Completed")), "completed");
        assert_ne!(normalize_status(Some("Done")), normalize_status(Some("In Process")));
    }

    #[test]
    fn missing_status_falls_back_to_to_do() {
        assert_eq!(normalize_status(None), "to-do");
        assert_eq!(normalize_status(Some("")), "to-do");
    }

    #[test]
    fn unrecognized_status_keeps_lowercased_form() {
        assert_eq!(normalize_status(Some("Waiting On QA")), "waiting on qa");
        assert!(TaskStatusFilter::from_key("waiting on qa")
            .matches(&task("1", Some("Waiting On QA"))));
    }

    #[test]
    fn all_filter_returns_full_list_in_order() {
        let tasks = vec![
            task("1", Some("Done")),
            task("2", None),
            task("3", Some("In Progress")),
        ];
        let filtered = filter_tasks(&tasks, &TaskStatusFilter::All);
        let ids: Vec<&str> = filtered.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn in_progress_filter_counts_synonym_statuses() {
        let tasks = vec![task("1", Some("in progress"))];
        assert_eq!(status_count(&tasks, &TaskStatusFilter::InProgress), 1);
        assert_eq!(status_count(&tasks, &TaskStatusFilter::Completed), 0);
        assert_eq!(status_count(&tasks, &TaskStatusFilter::All), 1);
    }
}
