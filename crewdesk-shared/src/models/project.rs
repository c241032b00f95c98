/// Project model and database operations
///
/// Projects are jobs a company runs for a client. Every project records its
/// author; authorship is what grants regular users mutation rights, and it
/// scopes what non-admin users see when listing.
///
/// # Invariants
///
/// - `company_id` always equals the author's company at creation time and
///   is never reassigned afterwards.
/// - `client_id`, when set, references a client of the same company
///   (enforced by the authorization policy before insert).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     status TEXT NOT NULL DEFAULT 'planned',
///     client_id UUID REFERENCES clients(id) ON DELETE RESTRICT,
///     address VARCHAR(512),
///     notes TEXT,
///     start_date TIMESTAMPTZ,
///     end_date TIMESTAMPTZ,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT projects_status_check CHECK (
///         status IN ('planned', 'active', 'completed', 'archived')
///     )
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::EnumParseError;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    /// Not yet started
    Planned,

    /// Work in progress
    Active,

    /// Finished
    Completed,

    /// Kept for the books, hidden from day-to-day views
    Archived,
}

impl ProjectStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }
}

impl TryFrom<String> for ProjectStatus {
    type Error = EnumParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "planned" => Ok(ProjectStatus::Planned),
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            "archived" => Ok(ProjectStatus::Archived),
            _ => Err(EnumParseError {
                field: "status",
                value,
            }),
        }
    }
}

/// Project model representing a job for a client
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Lifecycle status
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,

    /// Client this project is for (optional)
    pub client_id: Option<Uuid>,

    /// Optional site address
    pub address: Option<String>,

    /// Optional free-form notes
    pub notes: Option<String>,

    /// Planned/actual start (midnight UTC for date-only input)
    pub start_date: Option<DateTime<Utc>>,

    /// Planned/actual end
    pub end_date: Option<DateTime<Utc>>,

    /// User who created the project
    pub author_id: Uuid,

    /// Company this project belongs to
    pub company_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub status: ProjectStatus,
    pub client_id: Option<Uuid>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub company_id: Uuid,
}

/// Input for updating an existing project (partial merge)
///
/// `author_id` and `company_id` are deliberately absent: neither is ever
/// reassignable.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub client_id: Option<Uuid>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Project {
    /// Creates a new project in the database
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, status, client_id, address, notes,
                                  start_date, end_date, author_id, company_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, status, client_id, address, notes, start_date, end_date,
                      author_id, company_id, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.status.as_str())
        .bind(data.client_id)
        .bind(data.address)
        .bind(data.notes)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.author_id)
        .bind(data.company_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, status, client_id, address, notes, start_date, end_date,
                   author_id, company_id, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects of a company, newest first (admin listing scope)
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, status, client_id, address, notes, start_date, end_date,
                   author_id, company_id, created_at, updated_at
            FROM projects
            WHERE company_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Lists projects authored by a user, newest first (non-admin listing scope)
    ///
    /// No company filter is needed: authorship only exists within one company.
    pub async fn list_by_author(pool: &PgPool, author_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, status, client_id, address, notes, start_date, end_date,
                   author_id, company_id, created_at, updated_at
            FROM projects
            WHERE author_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates an existing project
    ///
    /// Only non-None fields are written; `updated_at` always advances.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.client_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", client_id = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }
        if data.notes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", notes = ${}", bind_count));
        }
        if data.start_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_date = ${}", bind_count));
        }
        if data.end_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", end_date = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, status, client_id, address, notes, \
             start_date, end_date, author_id, company_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }
        if let Some(client_id) = data.client_id {
            q = q.bind(client_id);
        }
        if let Some(address) = data.address {
            q = q.bind(address);
        }
        if let Some(notes) = data.notes {
            q = q.bind(notes);
        }
        if let Some(start_date) = data.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = data.end_date {
            q = q.bind(end_date);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project by ID
    ///
    /// Hard delete; tasks of the project are removed by the cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_db_roundtrip() {
        for status in [
            ProjectStatus::Planned,
            ProjectStatus::Active,
            ProjectStatus::Completed,
            ProjectStatus::Archived,
        ] {
            let parsed = ProjectStatus::try_from(status.as_str().to_string()).unwrap();
            assert_eq!(parsed, status);
        }

        assert!(ProjectStatus::try_from("paused".to_string()).is_err());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::Active).unwrap(),
            "\"ACTIVE\""
        );
        let status: ProjectStatus = serde_json::from_str("\"ARCHIVED\"").unwrap();
        assert_eq!(status, ProjectStatus::Archived);
    }
}
