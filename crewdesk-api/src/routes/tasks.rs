/// Task resource endpoints
///
/// Tasks live inside a project and inherit its company. Creation must name
/// a project of the caller's company; an assignee, when given, must also be
/// a user of that company. Reads and mutations are company-scoped.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
    validation::{check_date_order, parse_date_opt, require_non_blank, validate},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Router,
};
use crewdesk_shared::auth::middleware::AuthContext;
use crewdesk_shared::auth::policy::{ensure_company_access, ensure_same_company_reference};
use crewdesk_shared::models::project::Project;
use crewdesk_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use crewdesk_shared::models::user::User;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task).put(update_task).delete(delete_task))
}

/// Create task request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTaskRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: String,

    /// Workflow status, defaults to TODO
    pub status: Option<TaskStatus>,

    pub notes: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Priority must be between 1 and 5"))]
    pub priority: Option<i32>,

    pub assignee_id: Option<Uuid>,

    /// Project the task belongs to; decides the task's company
    pub project_id: Uuid,

    pub start_date: Option<String>,

    pub end_date: Option<String>,
}

/// Update task request body (partial merge)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub status: Option<TaskStatus>,

    pub notes: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Priority must be between 1 and 5"))]
    pub priority: Option<i32>,

    pub assignee_id: Option<Uuid>,

    pub start_date: Option<String>,

    pub end_date: Option<String>,
}

/// Verifies that a referenced assignee exists in the caller's company
async fn check_assignee_reference(
    pool: &PgPool,
    assignee_id: Uuid,
    auth: &AuthContext,
) -> ApiResult<()> {
    let assignee = User::find_by_id(pool, assignee_id).await?;
    ensure_same_company_reference(assignee.map(|u| u.company_id), auth, "assigneeId")?;
    Ok(())
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_by_company(&state.db, auth.company_id).await?;
    Ok(Json(tasks))
}

/// POST /api/tasks
///
/// The task's company is derived from its project, never from the request.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    validate(&body)?;
    require_non_blank("title", &body.title)?;

    let start_date = parse_date_opt("startDate", body.start_date.as_deref())?;
    let end_date = parse_date_opt("endDate", body.end_date.as_deref())?;
    check_date_order(start_date, end_date)?;

    let project = Project::find_by_id(&state.db, body.project_id).await?;
    ensure_same_company_reference(
        project.as_ref().map(|p| p.company_id),
        &auth,
        "projectId",
    )?;

    if let Some(assignee_id) = body.assignee_id {
        check_assignee_reference(&state.db, assignee_id, &auth).await?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            title: body.title,
            status: body.status.unwrap_or(TaskStatus::Todo),
            notes: body.notes,
            priority: body.priority,
            assignee_id: body.assignee_id,
            project_id: body.project_id,
            company_id: auth.company_id,
            start_date,
            end_date,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, project_id = %task.project_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, id).await?;
    ensure_company_access(task.as_ref().map(|t| t.company_id), &auth)?;

    Ok(Json(task.ok_or_else(|| {
        ApiError::NotFound("Resource not found".to_string())
    })?))
}

/// PUT /api/tasks/:id
///
/// An empty diff is accepted and returns the task unchanged. This differs
/// from the other resources, which reject empty diffs; the existing
/// frontend relies on it.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    validate(&body)?;

    if let Some(title) = &body.title {
        require_non_blank("title", title)?;
    }

    let start_date = parse_date_opt("startDate", body.start_date.as_deref())?;
    let end_date = parse_date_opt("endDate", body.end_date.as_deref())?;
    check_date_order(start_date, end_date)?;

    let existing = Task::find_by_id(&state.db, id).await?;
    ensure_company_access(existing.as_ref().map(|t| t.company_id), &auth)?;

    if let Some(assignee_id) = body.assignee_id {
        check_assignee_reference(&state.db, assignee_id, &auth).await?;
    }

    let diff = UpdateTask {
        title: body.title,
        status: body.status,
        notes: body.notes,
        priority: body.priority,
        assignee_id: body.assignee_id,
        start_date,
        end_date,
    };

    if diff.is_empty() {
        // The policy check above proved the row exists
        return Ok(Json(existing.ok_or_else(|| {
            ApiError::NotFound("Resource not found".to_string())
        })?));
    }

    let updated = Task::update(&state.db, id, diff)
        .await?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(updated))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let existing = Task::find_by_id(&state.db, id).await?;
    ensure_company_access(existing.map(|t| t.company_id), &auth)?;

    Task::delete(&state.db, id).await?;

    tracing::info!(task_id = %id, company_id = %auth.company_id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_requires_project() {
        let raw = r#"{"title": "Order materials"}"#;
        let parsed: Result<CreateTaskRequest, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_create_request_rejects_company_field() {
        // The company always comes from the project
        let raw = r#"{
            "title": "Order materials",
            "projectId": "11111111-1111-1111-1111-111111111111",
            "companyId": "22222222-2222-2222-2222-222222222222"
        }"#;
        let parsed: Result<CreateTaskRequest, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_status_parses_wire_values() {
        let raw = r#"{
            "title": "Order materials",
            "projectId": "11111111-1111-1111-1111-111111111111",
            "status": "IN_PROGRESS"
        }"#;
        let req: CreateTaskRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.status, Some(TaskStatus::InProgress));
    }
}
