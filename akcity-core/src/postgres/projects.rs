/// Postgres adapter for the project store
///
/// Structured sub-records (building info, client, documents) live in JSONB
/// columns; the team is a UUID array. Rows rehydrate through
/// [`Project::from_storage`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::project::{
    BuildingInfo, ClientInfo, Project, ProjectDocument, ProjectStatus,
};
use crate::error::{CoreError, CoreResult};
use crate::repositories::{Page, PageOf, ProjectFilter, ProjectRepository};

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: String,
    location: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: ProjectStatus,
    progress: i16,
    project_manager: Uuid,
    team: Vec<Uuid>,
    building_info: Json<BuildingInfo>,
    client: Json<ClientInfo>,
    documents: Json<Vec<ProjectDocument>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self) -> Project {
        Project::from_storage(Project {
            id: self.id,
            name: self.name,
            description: self.description,
            location: self.location,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
            // Schema CHECK keeps progress in 0..=100
            progress: self.progress as u8,
            project_manager: self.project_manager,
            team: self.team,
            building_info: self.building_info.0,
            client: self.client.0,
            documents: self.documents.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Project store over a Postgres pool
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn create(&self, project: &Project) -> CoreResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects (id, name, description, location, start_date, end_date,
                                  status, progress, project_manager, team, building_info,
                                  client, documents, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id, name, description, location, start_date, end_date, status,
                      progress, project_manager, team, building_info, client, documents,
                      created_at, updated_at
            "#,
        )
        .bind(project.id)
        .bind(project.name.clone())
        .bind(project.description.clone())
        .bind(project.location.clone())
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.status)
        .bind(project.progress as i16)
        .bind(project.project_manager)
        .bind(project.team.clone())
        .bind(Json(project.building_info.clone()))
        .bind(Json(project.client.clone()))
        .bind(Json(project.documents.clone()))
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_project())
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, location, start_date, end_date, status,
                   progress, project_manager, team, building_info, client, documents,
                   created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProjectRow::into_project))
    }

    async fn update(&self, project: &Project) -> CoreResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            UPDATE projects
            SET name = $2, description = $3, location = $4, start_date = $5,
                end_date = $6, status = $7, progress = $8, project_manager = $9,
                team = $10, building_info = $11, client = $12, documents = $13,
                updated_at = $14
            WHERE id = $1
            RETURNING id, name, description, location, start_date, end_date, status,
                      progress, project_manager, team, building_info, client, documents,
                      created_at, updated_at
            "#,
        )
        .bind(project.id)
        .bind(project.name.clone())
        .bind(project.description.clone())
        .bind(project.location.clone())
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.status)
        .bind(project.progress as i16)
        .bind(project.project_manager)
        .bind(project.team.clone())
        .bind(Json(project.building_info.clone()))
        .bind(Json(project.client.clone()))
        .bind(Json(project.documents.clone()))
        .bind(project.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProjectRow::into_project)
            .ok_or_else(|| CoreError::NotFound("Project".to_string()))
    }

    async fn delete(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &ProjectFilter, page: Page) -> CoreResult<PageOf<Project>> {
        let page = page.clamped();

        let mut conditions = String::new();
        let mut bind_count = 0;

        if filter.status.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.manager.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND project_manager = ${}", bind_count));
        }
        if filter.search.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(
                " AND (name ILIKE ${0} OR location ILIKE ${0})",
                bind_count
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM projects WHERE TRUE{}", conditions);
        let mut count_q = sqlx::query_as::<_, (i64,)>(&count_query);
        if let Some(status) = filter.status {
            count_q = count_q.bind(status);
        }
        if let Some(manager) = filter.manager {
            count_q = count_q.bind(manager);
        }
        if let Some(ref search) = filter.search {
            count_q = count_q.bind(format!("%{}%", search));
        }
        let (total,) = count_q.fetch_one(&self.pool).await?;

        let list_query = format!(
            "SELECT id, name, description, location, start_date, end_date, status, \
             progress, project_manager, team, building_info, client, documents, \
             created_at, updated_at \
             FROM projects WHERE TRUE{} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            conditions,
            bind_count + 1,
            bind_count + 2
        );
        let mut q = sqlx::query_as::<_, ProjectRow>(&list_query);
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(manager) = filter.manager {
            q = q.bind(manager);
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
            items: rows.into_iter().map(ProjectRow::into_project).collect(),
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    async fn find_by_manager(&self, manager: Uuid) -> CoreResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, location, start_date, end_date, status,
                   progress, project_manager, team, building_info, client, documents,
                   created_at, updated_at
            FROM projects
            WHERE project_manager = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(manager)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProjectRow::into_project).collect())
    }

    async fn find_by_team_member(&self, member: Uuid) -> CoreResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, location, start_date, end_date, status,
                   progress, project_manager, team, building_info, client, documents,
                   created_at, updated_at
            FROM projects
            WHERE $1 = ANY(team)
            ORDER BY created_at DESC
            "#,
        )
        .bind(member)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProjectRow::into_project).collect())
    }

    async fn find_by_status(&self, status: ProjectStatus) -> CoreResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, location, start_date, end_date, status,
                   progress, project_manager, team, building_info, client, documents,
                   created_at, updated_at
            FROM projects
            WHERE status = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProjectRow::into_project).collect())
    }

    async fn find_overdue(&self) -> CoreResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, location, start_date, end_date, status,
                   progress, project_manager, team, building_info, client, documents,
                   created_at, updated_at
            FROM projects
            WHERE status = 'in_progress' AND end_date < NOW()
            ORDER BY end_date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProjectRow::into_project).collect())
    }

    async fn count(&self) -> CoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_by_status(&self) -> CoreResult<Vec<(ProjectStatus, i64)>> {
        let counts = sqlx::query_as::<_, (ProjectStatus, i64)>(
            "SELECT status, COUNT(*) FROM projects GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::project::ConstructionType;

    #[test]
    fn test_row_rehydration() {
        let row = ProjectRow {
            id: Uuid::new_v4(),
            name: "Hilltop Residences".to_string(),
            description: "".to_string(),
            location: "Ankara".to_string(),
            start_date: Utc::now(),
            end_date: Utc::now(),
            status: ProjectStatus::InProgress,
            progress: 40,
            project_manager: Uuid::new_v4(),
            team: vec![Uuid::new_v4()],
            building_info: Json(BuildingInfo {
                total_blocks: 2,
                total_apartments: 48,
                apartments_per_block: 24,
                floors_per_block: 8,
                total_area: 9000.0,
                construction_type: ConstructionType::Residential,
            }),
            client: Json(ClientInfo {
                name: "Client".to_string(),
                contact: "Contact".to_string(),
                phone: "+903120000000".to_string(),
                email: "client@example.com".to_string(),
                address: None,
            }),
            documents: Json(vec![]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let project = row.into_project();
        assert_eq!(project.progress, 40u8);
        assert_eq!(project.building_info.total_apartments, 48);
        assert_eq!(project.team.len(), 1);
    }

    // Queries are covered by the integration tests in akcity-api/tests/
}
