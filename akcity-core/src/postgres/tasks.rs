/// Postgres adapter for the task store
///
/// Location, attachments, and tags live in JSONB columns. Rows rehydrate
/// through [`Task::from_storage`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::task::{
    Task, TaskAttachment, TaskCategory, TaskLocation, TaskPriority, TaskStatus,
};
use crate::error::{CoreError, CoreResult};
use crate::repositories::{Page, PageOf, TaskFilter, TaskRepository};

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: String,
    project_id: Uuid,
    assigned_to: Uuid,
    assigned_by: Uuid,
    status: TaskStatus,
    priority: TaskPriority,
    category: TaskCategory,
    due_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    estimated_hours: Option<f64>,
    actual_hours: f64,
    location: Json<TaskLocation>,
    attachments: Json<Vec<TaskAttachment>>,
    tags: Json<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> Task {
        Task::from_storage(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            project_id: self.project_id,
            assigned_to: self.assigned_to,
            assigned_by: self.assigned_by,
            status: self.status,
            priority: self.priority,
            category: self.category,
            due_date: self.due_date,
            completed_at: self.completed_at,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            location: self.location.0,
            attachments: self.attachments.0,
            tags: self.tags.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Task store over a Postgres pool
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: &Task) -> CoreResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (id, title, description, project_id, assigned_to,
                               assigned_by, status, priority, category, due_date,
                               completed_at, estimated_hours, actual_hours, location,
                               attachments, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18)
            RETURNING id, title, description, project_id, assigned_to, assigned_by,
                      status, priority, category, due_date, completed_at,
                      estimated_hours, actual_hours, location, attachments, tags,
                      created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(task.title.clone())
        .bind(task.description.clone())
        .bind(task.project_id)
        .bind(task.assigned_to)
        .bind(task.assigned_by)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.category)
        .bind(task.due_date)
        .bind(task.completed_at)
        .bind(task.estimated_hours)
        .bind(task.actual_hours)
        .bind(Json(task.location.clone()))
        .bind(Json(task.attachments.clone()))
        .bind(Json(task.tags.clone()))
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_task())
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, project_id, assigned_to, assigned_by,
                   status, priority, category, due_date, completed_at,
                   estimated_hours, actual_hours, location, attachments, tags,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TaskRow::into_task))
    }

    async fn update(&self, task: &Task) -> CoreResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, project_id = $4, assigned_to = $5,
                assigned_by = $6, status = $7, priority = $8, category = $9,
                due_date = $10, completed_at = $11, estimated_hours = $12,
                actual_hours = $13, location = $14, attachments = $15, tags = $16,
                updated_at = $17
            WHERE id = $1
            RETURNING id, title, description, project_id, assigned_to, assigned_by,
                      status, priority, category, due_date, completed_at,
                      estimated_hours, actual_hours, location, attachments, tags,
                      created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(task.title.clone())
        .bind(task.description.clone())
        .bind(task.project_id)
        .bind(task.assigned_to)
        .bind(task.assigned_by)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.category)
        .bind(task.due_date)
        .bind(task.completed_at)
        .bind(task.estimated_hours)
        .bind(task.actual_hours)
        .bind(Json(task.location.clone()))
        .bind(Json(task.attachments.clone()))
        .bind(Json(task.tags.clone()))
        .bind(task.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TaskRow::into_task)
            .ok_or_else(|| CoreError::NotFound("Task".to_string()))
    }

    async fn delete(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &TaskFilter, page: Page) -> CoreResult<PageOf<Task>> {
        let page = page.clamped();

        let mut conditions = String::new();
        let mut bind_count = 0;

        if filter.project.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND project_id = ${}", bind_count));
        }
        if filter.assignee.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND assigned_to = ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.priority.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND priority = ${}", bind_count));
        }
        if filter.category.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND category = ${}", bind_count));
        }
        if filter.search.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(
                " AND (title ILIKE ${0} OR description ILIKE ${0})",
                bind_count
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM tasks WHERE TRUE{}", conditions);
        let mut count_q = sqlx::query_as::<_, (i64,)>(&count_query);
        if let Some(project) = filter.project {
            count_q = count_q.bind(project);
        }
        if let Some(assignee) = filter.assignee {
            count_q = count_q.bind(assignee);
        }
        if let Some(status) = filter.status {
            count_q = count_q.bind(status);
        }
        if let Some(priority) = filter.priority {
            count_q = count_q.bind(priority);
        }
        if let Some(category) = filter.category {
            count_q = count_q.bind(category);
        }
        if let Some(ref search) = filter.search {
            count_q = count_q.bind(format!("%{}%", search));
        }
        let (total,) = count_q.fetch_one(&self.pool).await?;

        let list_query = format!(
            "SELECT id, title, description, project_id, assigned_to, assigned_by, \
             status, priority, category, due_date, completed_at, estimated_hours, \
             actual_hours, location, attachments, tags, created_at, updated_at \
             FROM tasks WHERE TRUE{} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            conditions,
            bind_count + 1,
            bind_count + 2
        );
        let mut q = sqlx::query_as::<_, TaskRow>(&list_query);
        if let Some(project) = filter.project {
            q = q.bind(project);
        }
        if let Some(assignee) = filter.assignee {
            q = q.bind(assignee);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(priority) = filter.priority {
            q = q.bind(priority);
        }
        if let Some(category) = filter.category {
            q = q.bind(category);
        }
        if let Some(ref search) = filter.search {
            q = q.bind(format!("%{}%", search));
        }
        let rows = q
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(PageOf {
            items: rows.into_iter().map(TaskRow::into_task).collect(),
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    async fn find_by_project(&self, project: Uuid) -> CoreResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, project_id, assigned_to, assigned_by,
                   status, priority, category, due_date, completed_at,
                   estimated_hours, actual_hours, location, attachments, tags,
                   created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }

    async fn find_by_assignee(&self, assignee: Uuid) -> CoreResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, project_id, assigned_to, assigned_by,
                   status, priority, category, due_date, completed_at,
                   estimated_hours, actual_hours, location, attachments, tags,
                   created_at, updated_at
            FROM tasks
            WHERE assigned_to = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(assignee)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }

    async fn find_overdue(&self) -> CoreResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, project_id, assigned_to, assigned_by,
                   status, priority, category, due_date, completed_at,
                   estimated_hours, actual_hours, location, attachments, tags,
                   created_at, updated_at
            FROM tasks
            WHERE due_date IS NOT NULL
              AND due_date < NOW()
              AND status NOT IN ('completed', 'cancelled')
            ORDER BY due_date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }

    async fn find_due_within(&self, days: i64) -> CoreResult<Vec<Task>> {
        let now = Utc::now();
        let until = now + Duration::days(days);

        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, project_id, assigned_to, assigned_by,
                   status, priority, category, due_date, completed_at,
                   estimated_hours, actual_hours, location, attachments, tags,
                   created_at, updated_at
            FROM tasks
            WHERE due_date IS NOT NULL
              AND due_date > $1
              AND due_date <= $2
              AND status NOT IN ('completed', 'cancelled')
            ORDER BY due_date ASC
            "#,
        )
        .bind(now)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }

    async fn count(&self) -> CoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_by_status(&self) -> CoreResult<Vec<(TaskStatus, i64)>> {
        let counts = sqlx::query_as::<_, (TaskStatus, i64)>(
            "SELECT status, COUNT(*) FROM tasks GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn count_by_priority(&self) -> CoreResult<Vec<(TaskPriority, i64)>> {
        let counts = sqlx::query_as::<_, (TaskPriority, i64)>(
            "SELECT priority, COUNT(*) FROM tasks GROUP BY priority ORDER BY priority",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
