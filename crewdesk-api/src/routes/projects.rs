/// Project resource endpoints
///
/// Projects record their author. Listing is role-scoped (admins see the
/// whole company, users only what they authored), and update/delete require
/// ADMIN or authorship. The author and company of a project are fixed at
/// creation and never reassigned.

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
use crewdesk_shared::auth::policy::{
    ensure_company_access, ensure_project_mutation, ensure_same_company_reference,
    project_list_scope, ProjectListScope,
};
use crewdesk_shared::models::client::Client;
use crewdesk_shared::models::project::{CreateProject, Project, ProjectStatus, UpdateProject};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

/// Create project request body
///
/// Dates arrive as strings ("YYYY-MM-DD" or RFC 3339) and are coerced
/// during validation. The author is always the caller; it cannot be
/// supplied.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProjectRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,

    /// Lifecycle status, defaults to PLANNED
    pub status: Option<ProjectStatus>,

    pub client_id: Option<Uuid>,

    #[validate(length(max = 512, message = "Address must be at most 512 characters"))]
    pub address: Option<String>,

    pub notes: Option<String>,

    pub start_date: Option<String>,

    pub end_date: Option<String>,
}

/// Update project request body (partial merge)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProjectRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    pub status: Option<ProjectStatus>,

    pub client_id: Option<Uuid>,

    #[validate(length(max = 512, message = "Address must be at most 512 characters"))]
    pub address: Option<String>,

    pub notes: Option<String>,

    pub start_date: Option<String>,

    pub end_date: Option<String>,
}

impl UpdateProjectRequest {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.client_id.is_none()
            && self.address.is_none()
            && self.notes.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Verifies that a referenced client exists in the caller's company
async fn check_client_reference(
    pool: &PgPool,
    client_id: Uuid,
    auth: &AuthContext,
) -> ApiResult<()> {
    let client = Client::find_by_id(pool, client_id).await?;
    ensure_same_company_reference(client.map(|c| c.company_id), auth, "clientId")?;
    Ok(())
}

/// GET /api/projects
///
/// Admins see every project of their company; regular users only the
/// projects they authored.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = match project_list_scope(&auth) {
        ProjectListScope::Company(company_id) => {
            Project::list_by_company(&state.db, company_id).await?
        }
        ProjectListScope::Author(author_id) => {
            Project::list_by_author(&state.db, author_id).await?
        }
    };

    Ok(Json(projects))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    validate(&body)?;
    require_non_blank("name", &body.name)?;

    let start_date = parse_date_opt("startDate", body.start_date.as_deref())?;
    let end_date = parse_date_opt("endDate", body.end_date.as_deref())?;
    check_date_order(start_date, end_date)?;

    if let Some(client_id) = body.client_id {
        check_client_reference(&state.db, client_id, &auth).await?;
    }

    let project = Project::create(
        &state.db,
        CreateProject {
            name: body.name,
            status: body.status.unwrap_or(ProjectStatus::Planned),
            client_id: body.client_id,
            address: body.address,
            notes: body.notes,
            start_date,
            end_date,
            author_id: auth.user_id,
            company_id: auth.company_id,
        },
    )
    .await?;

    tracing::info!(project_id = %project.id, author_id = %auth.user_id, "Project created");

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id
///
/// Reads are company-scoped only; a regular user may read projects they
/// did not author.
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = Project::find_by_id(&state.db, id).await?;
    ensure_company_access(project.as_ref().map(|p| p.company_id), &auth)?;

    Ok(Json(project.ok_or_else(|| {
        ApiError::NotFound("Resource not found".to_string())
    })?))
}

/// PUT /api/projects/:id
///
/// Requires ADMIN or authorship. Within the company the project's existence
/// is already known, so a non-author gets 403, not 404.
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    validate(&body)?;

    if body.is_empty() {
        return Err(ApiError::BadRequest("No update data provided".to_string()));
    }
    if let Some(name) = &body.name {
        require_non_blank("name", name)?;
    }

    let start_date = parse_date_opt("startDate", body.start_date.as_deref())?;
    let end_date = parse_date_opt("endDate", body.end_date.as_deref())?;
    check_date_order(start_date, end_date)?;

    let existing = Project::find_by_id(&state.db, id).await?;
    ensure_project_mutation(existing.map(|p| (p.company_id, p.author_id)), &auth)?;

    if let Some(client_id) = body.client_id {
        check_client_reference(&state.db, client_id, &auth).await?;
    }

    let updated = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: body.name,
            status: body.status,
            client_id: body.client_id,
            address: body.address,
            notes: body.notes,
            start_date,
            end_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(updated))
}

/// DELETE /api/projects/:id
///
/// Requires ADMIN or authorship. Tasks of the project go with it.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let existing = Project::find_by_id(&state.db, id).await?;
    ensure_project_mutation(existing.map(|p| (p.company_id, p.author_id)), &auth)?;

    Project::delete(&state.db, id).await?;

    tracing::info!(project_id = %id, user_id = %auth.user_id, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}
