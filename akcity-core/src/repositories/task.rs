use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::task::{Task, TaskCategory, TaskPriority, TaskStatus};
use crate::error::CoreResult;

use super::{Page, PageOf};

/// Optional narrowing criteria for task listings
///
/// `search` matches title or description, case-insensitive substring.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub project: Option<Uuid>,
    pub assignee: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub search: Option<String>,
}

/// Storage contract for tasks
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persists a new task
    async fn create(&self, task: &Task) -> CoreResult<Task>;

    /// Looks a task up by ID
    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<Task>>;

    /// Persists changes to an existing task
    ///
    /// # Errors
    ///
    /// [`crate::error::CoreError::NotFound`] when the task no longer exists
    async fn update(&self, task: &Task) -> CoreResult<Task>;

    /// Deletes a task; `false` when nothing was there
    async fn delete(&self, id: Uuid) -> CoreResult<bool>;

    /// Lists tasks newest first, filtered and paged
    async fn list(&self, filter: &TaskFilter, page: Page) -> CoreResult<PageOf<Task>>;

    /// All tasks in a project
    async fn find_by_project(&self, project: Uuid) -> CoreResult<Vec<Task>>;

    /// All tasks assigned to a user
    async fn find_by_assignee(&self, assignee: Uuid) -> CoreResult<Vec<Task>>;

    /// Open tasks past their due date
    async fn find_overdue(&self) -> CoreResult<Vec<Task>>;

    /// Open tasks due within the next `days` days
    async fn find_due_within(&self, days: i64) -> CoreResult<Vec<Task>>;

    /// Total task count
    async fn count(&self) -> CoreResult<i64>;

    /// Task counts grouped by status; statuses with no tasks are absent
    async fn count_by_status(&self) -> CoreResult<Vec<(TaskStatus, i64)>>;

    /// Task counts grouped by priority; priorities with no tasks are absent
    async fn count_by_priority(&self) -> CoreResult<Vec<(TaskPriority, i64)>>;
}
