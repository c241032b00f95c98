/// Task model and database operations
///
/// Tasks are work items within a project, optionally assigned to a user.
///
/// # Invariants
///
/// - `company_id` always equals the owning project's company.
/// - `assignee_id`, when set, references a user of the same company
///   (enforced by the authorization policy before insert/update).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     status TEXT NOT NULL DEFAULT 'todo',
///     notes TEXT,
///     priority INTEGER,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     start_date TIMESTAMPTZ,
///     end_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT tasks_status_check CHECK (
///         status IN ('todo', 'in_progress', 'done', 'blocked')
///     ),
///     CONSTRAINT tasks_priority_check CHECK (
///         priority IS NULL OR (priority BETWEEN 1 AND 5)
///     )
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::EnumParseError;

/// Task workflow status
///
/// On the wire these are `TODO` / `IN_PROGRESS` / `DONE` / `BLOCKED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,

    /// Waiting on something external
    Blocked,
}

impl TaskStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = EnumParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            "blocked" => Ok(TaskStatus::Blocked),
            _ => Err(EnumParseError {
                field: "status",
                value,
            }),
        }
    }
}

/// Task model representing a work item within a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Workflow status
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,

    /// Optional free-form notes
    pub notes: Option<String>,

    /// Optional priority, 1 (highest) to 5 (lowest)
    pub priority: Option<i32>,

    /// User assigned to the task (optional)
    pub assignee_id: Option<Uuid>,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// Company this task belongs to (always the project's company)
    pub company_id: Uuid,

    /// Planned start
    pub start_date: Option<DateTime<Utc>>,

    /// Planned end
    pub end_date: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub status: TaskStatus,
    pub notes: Option<String>,
    pub priority: Option<i32>,
    pub assignee_id: Option<Uuid>,
    pub project_id: Uuid,
    pub company_id: Uuid,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Input for updating an existing task (partial merge)
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub notes: Option<String>,
    pub priority: Option<i32>,
    pub assignee_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl UpdateTask {
    /// True when no field is set
    ///
    /// An empty task diff is accepted and returns the entity unchanged;
    /// other resources reject empty diffs. The asymmetry is intentional and
    /// matches the existing frontend's expectations.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.notes.is_none()
            && self.priority.is_none()
            && self.assignee_id.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

impl Task {
    /// Creates a new task in the database
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, status, notes, priority, assignee_id,
                               project_id, company_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, status, notes, priority, assignee_id, project_id,
                      company_id, start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.status.as_str())
        .bind(data.notes)
        .bind(data.priority)
        .bind(data.assignee_id)
        .bind(data.project_id)
        .bind(data.company_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, status, notes, priority, assignee_id, project_id,
                   company_id, start_date, end_date, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks of a company, newest first
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, status, notes, priority, assignee_id, project_id,
                   company_id, start_date, end_date, created_at, updated_at
            FROM tasks
            WHERE company_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates an existing task
    ///
    /// Only non-None fields are written; `updated_at` always advances.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.notes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", notes = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_id = ${}", bind_count));
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
            " WHERE id = $1 RETURNING id, title, status, notes, priority, assignee_id, \
             project_id, company_id, start_date, end_date, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }
        if let Some(notes) = data.notes {
            q = q.bind(notes);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(assignee_id) = data.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(start_date) = data.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = data.end_date {
            q = q.bind(end_date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task by ID
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
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
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Blocked,
        ] {
            let parsed = TaskStatus::try_from(status.as_str().to_string()).unwrap();
            assert_eq!(parsed, status);
        }

        assert!(TaskStatus::try_from("waiting".to_string()).is_err());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        let status: TaskStatus = serde_json::from_str("\"BLOCKED\"").unwrap();
        assert_eq!(status, TaskStatus::Blocked);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdateTask::default().is_empty());

        let diff = UpdateTask {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        assert!(!diff.is_empty());
    }
}
