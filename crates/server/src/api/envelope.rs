//! JSON envelope shared by every `/api` response.
//!
//! Success bodies carry `data`; failures carry a user-facing `message`, the
//! underlying detail under `errors`, and never a payload.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use dairy_core::errors::{ApplicationError, DomainError, InterfaceError};
use dairy_db::RepositoryError;

#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiEnvelope<T>>), ApiError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    respond(StatusCode::OK, data, None)
}

pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> ApiResult<T> {
    respond(StatusCode::CREATED, data, Some(message.into()))
}

pub fn with_message<T: Serialize>(data: T, message: impl Into<String>) -> ApiResult<T> {
    respond(StatusCode::OK, data, Some(message.into()))
}

fn respond<T: Serialize>(status: StatusCode, data: T, message: Option<String>) -> ApiResult<T> {
    Ok((status, Json(ApiEnvelope { success: true, data: Some(data), message, errors: None })))
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    interface: InterfaceError,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from(ApplicationError::Domain(DomainError::InvariantViolation(message.into())))
    }
}

fn status_for(interface: &InterfaceError) -> StatusCode {
    match interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        let interface = error.into_interface(Uuid::new_v4().to_string());
        Self { status: status_for(&interface), interface }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        Self::from(ApplicationError::from(error))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("invalid request body: {}", rejection.body_text()))
    }
}

/// `Json` body extractor whose rejections are rendered as envelopes.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await?;
        Ok(Self(value))
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self::from(ApplicationError::from(error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let correlation_id = self.interface.correlation_id().to_string();
        let errors = match &self.interface {
            InterfaceError::BadRequest { message, .. }
            | InterfaceError::NotFound { message, .. } => {
                warn!(
                    event_name = "api.request.rejected",
                    correlation_id = %correlation_id,
                    status = status.as_u16(),
                    error = %message,
                    "request rejected"
                );
                Some(vec![message.clone()])
            }
            InterfaceError::ServiceUnavailable { message, .. }
            | InterfaceError::Internal { message, .. } => {
                error!(
                    event_name = "api.request.failed",
                    correlation_id = %correlation_id,
                    status = status.as_u16(),
                    error = %message,
                    "request failed"
                );
                Some(vec![format!("reference {correlation_id}")])
            }
        };

        let body: ApiEnvelope<()> = ApiEnvelope {
            success: false,
            data: None,
            message: Some(self.interface.user_message().to_string()),
            errors,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use dairy_db::RepositoryError;

    use super::{ok, ApiError};

    async fn body_of(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    #[test]
    fn success_envelope_omits_empty_fields() {
        let (status, axum::Json(envelope)) = ok(vec![1, 2]).expect("ok");
        let json = serde_json::to_value(&envelope).expect("serialize");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "success": true, "data": [1, 2] }));
    }

    #[tokio::test]
    async fn not_found_reports_the_missing_record() {
        let (status, body) =
            body_of(ApiError::from(RepositoryError::NotFound("sale `S-9`".to_string()))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"][0], "sale `S-9`");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn unavailable_pool_is_a_retryable_failure() {
        let (status, body) =
            body_of(ApiError::from(RepositoryError::Database(sqlx::Error::PoolTimedOut))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["errors"][0].as_str().expect("detail").starts_with("reference "));
    }

    #[tokio::test]
    async fn corrupt_stored_values_hide_internal_detail() {
        let (status, body) =
            body_of(ApiError::from(RepositoryError::Decode("amount `x`".to_string()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["errors"][0].as_str().expect("detail");
        assert!(detail.starts_with("reference "));
        assert!(!detail.contains("amount"));
    }
}
