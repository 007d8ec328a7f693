/// In-memory adapters backed by RwLock'd maps
///
/// Back use-case unit tests and local runs without a database. Behavior
/// mirrors the Postgres adapters: unique email enforcement, newest-first
/// listings, clamped pages, grouped counts.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entities::project::{Project, ProjectStatus};
use crate::entities::task::{Task, TaskPriority, TaskStatus};
use crate::entities::user::{PublicUser, User, UserRole, UserStatus};
use crate::error::{CoreError, CoreResult};

use super::{
    Page, PageOf, ProjectFilter, ProjectRepository, TaskFilter, TaskRepository, UserFilter,
    UserRepository,
};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn paged<T>(items: Vec<T>, page: Page) -> PageOf<T> {
    let page = page.clamped();
    let total = items.len() as i64;
    let items: Vec<T> = items
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect();

    PageOf {
        items,
        total,
        limit: page.limit,
        offset: page.offset,
    }
}

/// User store on a map
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> CoreResult<User> {
        let mut users = self.users.write().await;

        // Same uniqueness rule the database index enforces
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(CoreError::DuplicateEmail);
        }

        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<PublicUser>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .map(|u| u.to_public()))
    }

    async fn find_by_email_with_password(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update(&self, user: &User) -> CoreResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(CoreError::NotFound("User".to_string()));
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(CoreError::DuplicateEmail);
        }

        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn list(&self, filter: &UserFilter, page: Page) -> CoreResult<PageOf<User>> {
        let users = self.users.read().await;

        let mut matches: Vec<User> = users
            .values()
            .filter(|u| filter.role.map_or(true, |r| u.role == r))
            .filter(|u| filter.status.map_or(true, |s| u.status == s))
            .filter(|u| {
                filter.search.as_deref().map_or(true, |q| {
                    contains_ci(&u.name, q) || contains_ci(&u.email, q)
                })
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(paged(matches, page))
    }

    async fn find_by_role(&self, role: UserRole) -> CoreResult<Vec<User>> {
        let mut matches: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn find_by_status(&self, status: UserStatus) -> CoreResult<Vec<User>> {
        let mut matches: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.status == status)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn record_login(&self, id: Uuid) -> CoreResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.record_login();
        }
        Ok(())
    }

    async fn count(&self) -> CoreResult<i64> {
        Ok(self.users.read().await.len() as i64)
    }

    async fn count_by_role(&self) -> CoreResult<Vec<(UserRole, i64)>> {
        let users = self.users.read().await;

        Ok(UserRole::ALL
            .iter()
            .filter_map(|role| {
                let n = users.values().filter(|u| u.role == *role).count() as i64;
                (n > 0).then_some((*role, n))
            })
            .collect())
    }

    async fn count_by_status(&self) -> CoreResult<Vec<(UserStatus, i64)>> {
        let users = self.users.read().await;

        Ok([
            UserStatus::Active,
            UserStatus::Inactive,
            UserStatus::Suspended,
            UserStatus::Pending,
        ]
        .iter()
        .filter_map(|status| {
            let n = users.values().filter(|u| u.status == *status).count() as i64;
            (n > 0).then_some((*status, n))
        })
        .collect())
    }
}

/// Project store on a map
#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    projects: RwLock<HashMap<Uuid, Project>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn create(&self, project: &Project) -> CoreResult<Project> {
        self.projects
            .write()
            .await
            .insert(project.id, project.clone());
        Ok(project.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<Project>> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn update(&self, project: &Project) -> CoreResult<Project> {
        let mut projects = self.projects.write().await;

        if !projects.contains_key(&project.id) {
            return Err(CoreError::NotFound("Project".to_string()));
        }

        projects.insert(project.id, project.clone());
        Ok(project.clone())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.projects.write().await.remove(&id).is_some())
    }

    async fn list(&self, filter: &ProjectFilter, page: Page) -> CoreResult<PageOf<Project>> {
        let projects = self.projects.read().await;

        let mut matches: Vec<Project> = projects
            .values()
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .filter(|p| filter.manager.map_or(true, |m| p.project_manager == m))
            .filter(|p| {
                filter.search.as_deref().map_or(true, |q| {
                    contains_ci(&p.name, q) || contains_ci(&p.location, q)
                })
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(paged(matches, page))
    }

    async fn find_by_manager(&self, manager: Uuid) -> CoreResult<Vec<Project>> {
        let mut matches: Vec<Project> = self
            .projects
            .read()
            .await
            .values()
            .filter(|p| p.project_manager == manager)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn find_by_team_member(&self, member: Uuid) -> CoreResult<Vec<Project>> {
        let mut matches: Vec<Project> = self
            .projects
            .read()
            .await
            .values()
            .filter(|p| p.team.contains(&member))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn find_by_status(&self, status: ProjectStatus) -> CoreResult<Vec<Project>> {
        let mut matches: Vec<Project> = self
            .projects
            .read()
            .await
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn find_overdue(&self) -> CoreResult<Vec<Project>> {
        let mut matches: Vec<Project> = self
            .projects
            .read()
            .await
            .values()
            .filter(|p| p.is_overdue())
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.end_date.cmp(&b.end_date));
        Ok(matches)
    }

    async fn count(&self) -> CoreResult<i64> {
        Ok(self.projects.read().await.len() as i64)
    }

    async fn count_by_status(&self) -> CoreResult<Vec<(ProjectStatus, i64)>> {
        let projects = self.projects.read().await;

        Ok([
            ProjectStatus::Planning,
            ProjectStatus::InProgress,
            ProjectStatus::Completed,
            ProjectStatus::Suspended,
            ProjectStatus::Cancelled,
        ]
        .iter()
        .filter_map(|status| {
            let n = projects.values().filter(|p| p.status == *status).count() as i64;
            (n > 0).then_some((*status, n))
        })
        .collect())
    }
}

/// Task store on a map
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task) -> CoreResult<Task> {
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn update(&self, task: &Task) -> CoreResult<Task> {
        let mut tasks = self.tasks.write().await;

        if !tasks.contains_key(&task.id) {
            return Err(CoreError::NotFound("Task".to_string()));
        }

        tasks.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.tasks.write().await.remove(&id).is_some())
    }

    async fn list(&self, filter: &TaskFilter, page: Page) -> CoreResult<PageOf<Task>> {
        let tasks = self.tasks.read().await;

        let mut matches: Vec<Task> = tasks
            .values()
            .filter(|t| filter.project.map_or(true, |p| t.project_id == p))
            .filter(|t| filter.assignee.map_or(true, |a| t.assigned_to == a))
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| filter.priority.map_or(true, |p| t.priority == p))
            .filter(|t| filter.category.map_or(true, |c| t.category == c))
            .filter(|t| {
                filter.search.as_deref().map_or(true, |q| {
                    contains_ci(&t.title, q) || contains_ci(&t.description, q)
                })
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(paged(matches, page))
    }

    async fn find_by_project(&self, project: Uuid) -> CoreResult<Vec<Task>> {
        let mut matches: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| t.project_id == project)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn find_by_assignee(&self, assignee: Uuid) -> CoreResult<Vec<Task>> {
        let mut matches: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| t.assigned_to == assignee)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn find_overdue(&self) -> CoreResult<Vec<Task>> {
        let mut matches: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| t.is_overdue())
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(matches)
    }

    async fn find_due_within(&self, days: i64) -> CoreResult<Vec<Task>> {
        let now = chrono::Utc::now();
        let until = now + chrono::Duration::days(days);

        let mut matches: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| !t.status.is_terminal())
            .filter(|t| t.due_date.map_or(false, |due| due > now && due <= until))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(matches)
    }

    async fn count(&self) -> CoreResult<i64> {
        Ok(self.tasks.read().await.len() as i64)
    }

    async fn count_by_status(&self) -> CoreResult<Vec<(TaskStatus, i64)>> {
        let tasks = self.tasks.read().await;

        Ok([
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ]
        .iter()
        .filter_map(|status| {
            let n = tasks.values().filter(|t| t.status == *status).count() as i64;
            (n > 0).then_some((*status, n))
        })
        .collect())
    }

    async fn count_by_priority(&self) -> CoreResult<Vec<(TaskPriority, i64)>> {
        let tasks = self.tasks.read().await;

        Ok([
            TaskPriority::Low,
            TaskPriority::Medium,
            TaskPriority::High,
            TaskPriority::Urgent,
        ]
        .iter()
        .filter_map(|priority| {
            let n = tasks.values().filter(|t| t.priority == *priority).count() as i64;
            (n > 0).then_some((*priority, n))
        })
        .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::project::{BuildingInfo, ClientInfo, ConstructionType, NewProject};
    use crate::entities::task::{NewTask, TaskCategory, TaskLocation};
    use chrono::{Duration, Utc};

    fn test_user(name: &str, email: &str, role: UserRole) -> User {
        User::new(
            name.to_string(),
            email.to_string(),
            "$argon2id$fake".to_string(),
            "+15551234567".to_string(),
            role,
        )
    }

    fn test_project(manager: Uuid, name: &str) -> Project {
        Project::new(NewProject {
            name: name.to_string(),
            description: "".to_string(),
            location: "Ankara".to_string(),
            start_date: Utc::now(),
            end_date: Utc::now() + Duration::days(180),
            project_manager: manager,
            team: vec![],
            building_info: BuildingInfo {
                total_blocks: 1,
                total_apartments: 12,
                apartments_per_block: 12,
                floors_per_block: 4,
                total_area: 2400.0,
                construction_type: ConstructionType::Residential,
            },
            client: ClientInfo {
                name: "Client".to_string(),
                contact: "Contact".to_string(),
                phone: "+903120000000".to_string(),
                email: "client@example.com".to_string(),
                address: None,
            },
        })
    }

    fn test_task(project: Uuid, assignee: Uuid, title: &str) -> Task {
        Task::new(NewTask {
            title: title.to_string(),
            description: "".to_string(),
            project_id: project,
            assigned_to: assignee,
            assigned_by: Uuid::new_v4(),
            priority: TaskPriority::Medium,
            category: TaskCategory::Construction,
            due_date: None,
            estimated_hours: None,
            location: TaskLocation::default(),
            tags: vec![],
        })
    }

    #[tokio::test]
    async fn test_user_create_and_lookup() {
        let repo = InMemoryUserRepository::new();
        let user = test_user("Jane Doe", "jane@x.com", UserRole::Worker);

        repo.create(&user).await.unwrap();

        let by_id = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "jane@x.com");

        let by_email = repo.find_by_email("JANE@X.COM").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let with_password = repo
            .find_by_email_with_password("jane@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(with_password.password_hash, "$argon2id$fake");
    }

    #[tokio::test]
    async fn test_user_duplicate_email_refused() {
        let repo = InMemoryUserRepository::new();
        repo.create(&test_user("Jane Doe", "jane@x.com", UserRole::Worker))
            .await
            .unwrap();

        let result = repo
            .create(&test_user("Other Jane", "Jane@X.com", UserRole::Client))
            .await;
        assert!(matches!(result, Err(CoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_user_update_missing_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let user = test_user("Ghost", "ghost@x.com", UserRole::Worker);

        let result = repo.update(&user).await;
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_user_delete() {
        let repo = InMemoryUserRepository::new();
        let user = test_user("Jane Doe", "jane@x.com", UserRole::Worker);
        repo.create(&user).await.unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_list_filters_and_pages() {
        let repo = InMemoryUserRepository::new();
        repo.create(&test_user("Jane Doe", "jane@x.com", UserRole::Worker))
            .await
            .unwrap();
        repo.create(&test_user("John Smith", "john@x.com", UserRole::Worker))
            .await
            .unwrap();
        repo.create(&test_user("Ada Client", "ada@x.com", UserRole::Client))
            .await
            .unwrap();

        let workers = repo
            .list(
                &UserFilter {
                    role: Some(UserRole::Worker),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(workers.total, 2);

        let search = repo
            .list(
                &UserFilter {
                    search: Some("jane".to_string()),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(search.total, 1);
        assert_eq!(search.items[0].name, "Jane Doe");

        let first_page = repo
            .list(&UserFilter::default(), Page::new(2, 0))
            .await
            .unwrap();
        assert_eq!(first_page.items.len(), 2);
        assert_eq!(first_page.total, 3);
    }

    #[tokio::test]
    async fn test_user_record_login() {
        let repo = InMemoryUserRepository::new();
        let user = test_user("Jane Doe", "jane@x.com", UserRole::Worker);
        repo.create(&user).await.unwrap();
        assert!(user.last_login.is_none());

        repo.record_login(user.id).await.unwrap();

        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn test_user_grouped_counts() {
        let repo = InMemoryUserRepository::new();
        repo.create(&test_user("Jane Doe", "jane@x.com", UserRole::Worker))
            .await
            .unwrap();
        repo.create(&test_user("John Smith", "john@x.com", UserRole::Worker))
            .await
            .unwrap();
        repo.create(&test_user("Ada Client", "ada@x.com", UserRole::Client))
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);

        let by_role = repo.count_by_role().await.unwrap();
        assert!(by_role.contains(&(UserRole::Worker, 2)));
        assert!(by_role.contains(&(UserRole::Client, 1)));
        assert_eq!(by_role.len(), 2, "empty roles are absent");
    }

    #[tokio::test]
    async fn test_project_lifecycle_queries() {
        let repo = InMemoryProjectRepository::new();
        let manager = Uuid::new_v4();

        let mut running = test_project(manager, "Hilltop Residences");
        running.update_status(ProjectStatus::InProgress).unwrap();
        running.end_date = Utc::now() - Duration::days(2);
        repo.create(&running).await.unwrap();

        let planned = test_project(manager, "Riverside Offices");
        repo.create(&planned).await.unwrap();

        let by_manager = repo.find_by_manager(manager).await.unwrap();
        assert_eq!(by_manager.len(), 2);

        let overdue = repo.find_overdue().await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, running.id);

        let by_status = repo.count_by_status().await.unwrap();
        assert!(by_status.contains(&(ProjectStatus::Planning, 1)));
        assert!(by_status.contains(&(ProjectStatus::InProgress, 1)));
    }

    #[tokio::test]
    async fn test_project_team_member_lookup() {
        let repo = InMemoryProjectRepository::new();
        let member = Uuid::new_v4();

        let mut with_member = test_project(Uuid::new_v4(), "Hilltop Residences");
        with_member.add_team_member(member);
        repo.create(&with_member).await.unwrap();
        repo.create(&test_project(Uuid::new_v4(), "Riverside Offices"))
            .await
            .unwrap();

        let found = repo.find_by_team_member(member).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, with_member.id);
    }

    #[tokio::test]
    async fn test_task_list_filters() {
        let repo = InMemoryTaskRepository::new();
        let project = Uuid::new_v4();
        let assignee = Uuid::new_v4();

        let mut urgent = test_task(project, assignee, "Fix leaking pipe");
        urgent.priority = TaskPriority::Urgent;
        urgent.category = TaskCategory::Plumbing;
        repo.create(&urgent).await.unwrap();
        repo.create(&test_task(project, Uuid::new_v4(), "Paint lobby walls"))
            .await
            .unwrap();
        repo.create(&test_task(Uuid::new_v4(), assignee, "Another site"))
            .await
            .unwrap();

        let in_project = repo
            .list(
                &TaskFilter {
                    project: Some(project),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(in_project.total, 2);

        let urgent_plumbing = repo
            .list(
                &TaskFilter {
                    priority: Some(TaskPriority::Urgent),
                    category: Some(TaskCategory::Plumbing),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(urgent_plumbing.total, 1);
        assert_eq!(urgent_plumbing.items[0].title, "Fix leaking pipe");

        let searched = repo
            .list(
                &TaskFilter {
                    search: Some("paint".to_string()),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(searched.total, 1);

        let mine = repo.find_by_assignee(assignee).await.unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[tokio::test]
    async fn test_task_due_queries() {
        let repo = InMemoryTaskRepository::new();
        let project = Uuid::new_v4();

        let mut due_soon = test_task(project, Uuid::new_v4(), "Due soon");
        due_soon.due_date = Some(Utc::now() + Duration::days(2));
        repo.create(&due_soon).await.unwrap();

        let mut late = test_task(project, Uuid::new_v4(), "Late");
        late.due_date = Some(Utc::now() - Duration::days(1));
        repo.create(&late).await.unwrap();

        let mut finished_late = test_task(project, Uuid::new_v4(), "Finished late");
        finished_late.due_date = Some(Utc::now() - Duration::days(1));
        finished_late.start().unwrap();
        finished_late.complete().unwrap();
        repo.create(&finished_late).await.unwrap();

        let overdue = repo.find_overdue().await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].title, "Late");

        let due_within = repo.find_due_within(3).await.unwrap();
        assert_eq!(due_within.len(), 1);
        assert_eq!(due_within[0].title, "Due soon");

        let none_due = repo.find_due_within(1).await.unwrap();
        assert!(none_due.is_empty());
    }
}
