/// Client resource endpoints
///
/// Clients have no authorship concept: any user of the owning company may
/// read and mutate them. All access is company-scoped; a client of another
/// company is indistinguishable from one that does not exist.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
    validation::{require_non_blank, validate},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Router,
};
use crewdesk_shared::auth::middleware::AuthContext;
use crewdesk_shared::auth::policy::ensure_company_access;
use crewdesk_shared::models::client::{Client, CreateClient, UpdateClient};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

/// Create client request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateClientRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 512, message = "Address must be at most 512 characters"))]
    pub address: Option<String>,
}

/// Update client request body (partial merge)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateClientRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 512, message = "Address must be at most 512 characters"))]
    pub address: Option<String>,
}

impl UpdateClientRequest {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

/// GET /api/clients
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Client>>> {
    let clients = Client::list_by_company(&state.db, auth.company_id).await?;
    Ok(Json(clients))
}

/// POST /api/clients
pub async fn create_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    validate(&body)?;
    require_non_blank("name", &body.name)?;

    let client = Client::create(
        &state.db,
        CreateClient {
            name: body.name,
            email: body.email,
            phone: body.phone,
            address: body.address,
            company_id: auth.company_id,
        },
    )
    .await?;

    tracing::info!(client_id = %client.id, company_id = %auth.company_id, "Client created");

    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/clients/:id
pub async fn get_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Client>> {
    let client = Client::find_by_id(&state.db, id).await?;
    ensure_company_access(client.as_ref().map(|c| c.company_id), &auth)?;

    // Safe: the policy check just proved the row exists
    Ok(Json(client.ok_or_else(|| {
        ApiError::NotFound("Resource not found".to_string())
    })?))
}

/// PUT /api/clients/:id
pub async fn update_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClientRequest>,
) -> ApiResult<Json<Client>> {
    validate(&body)?;

    if body.is_empty() {
        return Err(ApiError::BadRequest("No update data provided".to_string()));
    }
    if let Some(name) = &body.name {
        require_non_blank("name", name)?;
    }

    let existing = Client::find_by_id(&state.db, id).await?;
    ensure_company_access(existing.map(|c| c.company_id), &auth)?;

    let updated = Client::update(
        &state.db,
        id,
        UpdateClient {
            name: body.name,
            email: body.email,
            phone: body.phone,
            address: body.address,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(updated))
}

/// DELETE /api/clients/:id
///
/// Answers 409 when projects still reference the client; the foreign key
/// restricts the delete and the constraint violation is translated.
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let existing = Client::find_by_id(&state.db, id).await?;
    ensure_company_access(existing.map(|c| c.company_id), &auth)?;

    Client::delete(&state.db, id).await?;

    tracing::info!(client_id = %id, company_id = %auth.company_id, "Client deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_is_empty() {
        let empty: UpdateClientRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());

        let partial: UpdateClientRequest =
            serde_json::from_str(r#"{"phone": "555-0101"}"#).unwrap();
        assert!(!partial.is_empty());
    }

    #[test]
    fn test_create_request_rejects_unknown_fields() {
        let raw = r#"{"name": "Acme", "companyId": "11111111-1111-1111-1111-111111111111"}"#;
        let parsed: Result<CreateClientRequest, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }
}
