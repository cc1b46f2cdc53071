//! JSON response envelope and error mapping.

use axum::Json;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use cp_core::{DispatchError, ErrorClass, ValidationError};
use serde::Serialize;

/// Body of every JSON response.
#[derive(Debug, Serialize)]
pub struct Envelope {
    /// Reason phrase of the HTTP status, e.g. `"OK"`.
    pub message: &'static str,

    /// Operation result: an identity or a count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown")
}

/// A successful response.
#[derive(Debug, Clone, Copy)]
pub struct ApiResponse {
    status: StatusCode,
    info: Option<u64>,
}

impl ApiResponse {
    pub const fn new(status: StatusCode, info: Option<u64>) -> Self {
        Self { status, info }
    }

    pub const fn ok(info: u64) -> Self {
        Self::new(StatusCode::OK, Some(info))
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let body = Envelope {
            message: reason(self.status),
            info: self.info,
            error: None,
        };
        (self.status, Json(body)).into_response()
    }
}

/// A failed request, rendered as an error envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn unknown_route(path: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "unknown_route",
            message: format!("no route for {path}"),
        }
    }

    pub fn method_not_allowed(method: &Method, path: &str) -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            code: "method_not_allowed",
            message: format!("{method} is not supported on {path}"),
        }
    }

    fn invalid_body(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_body",
            message,
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        let status = match err.class() {
            ErrorClass::Caller => StatusCode::BAD_REQUEST,
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        DispatchError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_body(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::invalid_body(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, message = %self.message, "request failed");
        } else {
            tracing::debug!(code = self.code, message = %self.message, "request rejected");
        }

        let body = Envelope {
            message: reason(self.status),
            info: None,
            error: Some(ErrorBody {
                code: self.code,
                message: self.message,
            }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cp_core::GroupId;

    #[test]
    fn dispatch_errors_map_to_status_classes() {
        let group = GroupId::new(5).unwrap();

        let not_found = ApiError::from(DispatchError::GroupNotFound(group));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.code(), "group_not_found");

        let idle = ApiError::from(DispatchError::JourneyNotFound(group));
        assert_eq!(idle.status(), StatusCode::NOT_FOUND);
        assert_eq!(idle.code(), "journey_not_found");

        let invalid = ApiError::from(ValidationError::Missing { field: "gid" });
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let broken = ApiError::from(DispatchError::LockPoisoned);
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn envelope_omits_empty_fields() {
        let body = Envelope {
            message: reason(StatusCode::OK),
            info: None,
            error: None,
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"message":"OK"}"#);
    }

    #[test]
    fn error_envelope_carries_code_and_message() {
        let body = Envelope {
            message: reason(StatusCode::NOT_FOUND),
            info: None,
            error: Some(ErrorBody {
                code: "group_not_found",
                message: "group 7 not found".to_string(),
            }),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "message": "Not Found",
                "error": {"code": "group_not_found", "message": "group 7 not found"}
            })
        );
    }
}
