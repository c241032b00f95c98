/// JSON extraction that keeps rejections inside the error taxonomy
///
/// Axum's default `Json` extractor answers malformed bodies with a plain
/// text 422 before any handler runs. This wrapper funnels those rejections
/// through [`ApiError`] instead, so unknown fields, bad enum values, and
/// type mismatches come back as the same 400 body shape as every other
/// validation failure. It also serializes responses, so handlers use one
/// `Json` for both directions.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::ApiError;

/// Drop-in replacement for `axum::Json` with taxonomy-shaped rejections
#[derive(Debug, Clone, Copy)]
pub struct Json<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Json(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct StrictBody {
        #[allow(dead_code)]
        name: String,
    }

    async fn handler(Json(_body): Json<StrictBody>) -> StatusCode {
        StatusCode::OK
    }

    fn app() -> Router {
        Router::new().route("/", post(handler))
    }

    async fn post_body(body: &'static str) -> axum::response::Response {
        app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_field_is_400_not_422() {
        let response = post_body(r#"{"name": "ok", "extra": 1}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn syntax_error_is_400() {
        let response = post_body(r#"{"name": "#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn well_formed_body_passes_through() {
        let response = post_body(r#"{"name": "ok"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
