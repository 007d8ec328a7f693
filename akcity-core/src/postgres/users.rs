/// Postgres adapter for the user store
///
/// Rows rehydrate through [`User::from_storage`] so storage can never hand
/// out an entity that skipped invariant normalization. Email uniqueness is
/// enforced by the unique index on `email`; violations surface as
/// [`CoreError::DuplicateEmail`] through the error conversion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::user::{PublicUser, User, UserRole, UserStatus};
use crate::error::{CoreError, CoreResult};
use crate::repositories::{Page, PageOf, UserFilter, UserRepository};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    phone: String,
    role: UserRole,
    avatar: Option<String>,
    status: UserStatus,
    last_login: Option<DateTime<Utc>>,
    projects: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User::from_storage(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            phone: self.phone,
            role: self.role,
            avatar: self.avatar,
            status: self.status,
            last_login: self.last_login,
            projects: self.projects,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// User store over a Postgres pool
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> CoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, phone, role, avatar,
                               status, last_login, projects, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, name, email, password_hash, phone, role, avatar,
                      status, last_login, projects, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(user.name.clone())
        .bind(user.email.clone())
        .bind(user.password_hash.clone())
        .bind(user.phone.clone())
        .bind(user.role)
        .bind(user.avatar.clone())
        .bind(user.status)
        .bind(user.last_login)
        .bind(user.projects.clone())
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_user())
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, phone, role, avatar,
                   status, last_login, projects, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<PublicUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, phone, role, avatar,
                   status, last_login, projects, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user().to_public()))
    }

    async fn find_by_email_with_password(&self, email: &str) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, phone, role, avatar,
                   status, last_login, projects, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn update(&self, user: &User) -> CoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, phone = $5, role = $6,
                avatar = $7, status = $8, last_login = $9, projects = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING id, name, email, password_hash, phone, role, avatar,
                      status, last_login, projects, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(user.name.clone())
        .bind(user.email.clone())
        .bind(user.password_hash.clone())
        .bind(user.phone.clone())
        .bind(user.role)
        .bind(user.avatar.clone())
        .bind(user.status)
        .bind(user.last_login)
        .bind(user.projects.clone())
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user)
            .ok_or_else(|| CoreError::NotFound("User".to_string()))
    }

    async fn delete(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &UserFilter, page: Page) -> CoreResult<PageOf<User>> {
        let page = page.clamped();

        // One WHERE tail shared by the count and page queries
        let mut conditions = String::new();
        let mut bind_count = 0;

        if filter.role.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND role = ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.search.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(
                " AND (name ILIKE ${0} OR email ILIKE ${0})",
                bind_count
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM users WHERE TRUE{}", conditions);
        let mut count_q = sqlx::query_as::<_, (i64,)>(&count_query);
        if let Some(role) = filter.role {
            count_q = count_q.bind(role);
        }
        if let Some(status) = filter.status {
            count_q = count_q.bind(status);
        }
        if let Some(ref search) = filter.search {
            count_q = count_q.bind(format!("%{}%", search));
        }
        let (total,) = count_q.fetch_one(&self.pool).await?;

        let list_query = format!(
            "SELECT id, name, email, password_hash, phone, role, avatar, \
             status, last_login, projects, created_at, updated_at \
             FROM users WHERE TRUE{} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            conditions,
            bind_count + 1,
            bind_count + 2
        );
        let mut q = sqlx::query_as::<_, UserRow>(&list_query);
        if let Some(role) = filter.role {
            q = q.bind(role);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
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
            items: rows.into_iter().map(UserRow::into_user).collect(),
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    async fn find_by_role(&self, role: UserRole) -> CoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, phone, role, avatar,
                   status, last_login, projects, created_at, updated_at
            FROM users
            WHERE role = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn find_by_status(&self, status: UserStatus) -> CoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, phone, role, avatar,
                   status, last_login, projects, created_at, updated_at
            FROM users
            WHERE status = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn record_login(&self, id: Uuid) -> CoreResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn count(&self) -> CoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_by_role(&self) -> CoreResult<Vec<(UserRole, i64)>> {
        let counts = sqlx::query_as::<_, (UserRole, i64)>(
            "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn count_by_status(&self) -> CoreResult<Vec<(UserStatus, i64)>> {
        let counts = sqlx::query_as::<_, (UserStatus, i64)>(
            "SELECT status, COUNT(*) FROM users GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
