use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::project::{Project, ProjectStatus};
use crate::error::CoreResult;

use super::{Page, PageOf};

/// Optional narrowing criteria for project listings
///
/// `search` matches name or location, case-insensitive substring.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub manager: Option<Uuid>,
    pub search: Option<String>,
}

/// Storage contract for projects
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Persists a new project
    async fn create(&self, project: &Project) -> CoreResult<Project>;

    /// Looks a project up by ID
    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<Project>>;

    /// Persists changes to an existing project
    ///
    /// # Errors
    ///
    /// [`crate::error::CoreError::NotFound`] when the project no longer
    /// exists
    async fn update(&self, project: &Project) -> CoreResult<Project>;

    /// Deletes a project; `false` when nothing was there
    async fn delete(&self, id: Uuid) -> CoreResult<bool>;

    /// Lists projects newest first, filtered and paged
    async fn list(&self, filter: &ProjectFilter, page: Page) -> CoreResult<PageOf<Project>>;

    /// All projects run by a manager
    async fn find_by_manager(&self, manager: Uuid) -> CoreResult<Vec<Project>>;

    /// All projects a user is on the team of
    async fn find_by_team_member(&self, member: Uuid) -> CoreResult<Vec<Project>>;

    /// All projects in a status
    async fn find_by_status(&self, status: ProjectStatus) -> CoreResult<Vec<Project>>;

    /// Projects in progress and past their end date
    async fn find_overdue(&self) -> CoreResult<Vec<Project>>;

    /// Total project count
    async fn count(&self) -> CoreResult<i64>;

    /// Project counts grouped by status; statuses with no projects are
    /// absent
    async fn count_by_status(&self) -> CoreResult<Vec<(ProjectStatus, i64)>>;
}
