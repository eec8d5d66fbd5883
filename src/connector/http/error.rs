use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ErrorBody;
use crate::domain::DomainError;

/// HTTP face of a [`DomainError`].
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

/// Unreadable or incomplete request bodies are client errors like any other
/// validation failure.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DomainError::invalid_input(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::UnknownBackend(_) => StatusCode::NOT_FOUND,
            DomainError::MissingVariable(_)
            | DomainError::InvalidTemplate(_)
            | DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::Authentication(_) | DomainError::Upstream(_) => StatusCode::BAD_GATEWAY,
            DomainError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::DuplicateBackend(_)
            | DomainError::Configuration(_)
            | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.0.to_string(),
            code: status.as_u16(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_client_errors() {
        assert_eq!(
            ApiError(DomainError::UnknownBackend("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(DomainError::missing_variable("question")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(DomainError::timeout("slow")).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[tokio::test]
    async fn test_json_rejection_becomes_bad_request() {
        use axum::body::{to_bytes, Body};
        use axum::extract::FromRequest;
        use axum::http::Request;

        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"target": "all"}"#))
            .unwrap();
        let rejection = Json::<crate::connector::http::dto::QueryRequest>::from_request(request, &())
            .await
            .unwrap_err();

        let response = ApiError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, 400);
        assert!(body.error.contains("query"));
    }
}
