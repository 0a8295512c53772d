//! Problem-detail responses (`application/problem+json`).

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use supplyhub_core::DomainError;

const PROBLEM_PATH: &str = "/problem/";

/// Problem kinds, used as the last segment of the `type` URI.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProblemType {
    BadRequest,
    NotFound,
    Unprocessable,
    Precondition,
    Internal,
}

impl ProblemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProblemType::BadRequest => "badRequest",
            ProblemType::NotFound => "notFound",
            ProblemType::Unprocessable => "unprocessable",
            ProblemType::Precondition => "precondition",
            ProblemType::Internal => "internal",
        }
    }
}

pub fn problem(
    status: StatusCode,
    kind: ProblemType,
    detail: impl Into<String>,
    instance: &str,
) -> axum::response::Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/problem+json")],
        axum::Json(json!({
            "type": format!("{PROBLEM_PATH}{}", kind.as_str()),
            "title": status.canonical_reason().unwrap_or("Error"),
            "status": status.as_u16(),
            "detail": detail.into(),
            "instance": instance,
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError, instance: &str) -> axum::response::Response {
    match err {
        DomainError::NotFound(target) => problem(
            StatusCode::NOT_FOUND,
            ProblemType::NotFound,
            target.to_string(),
            instance,
        ),
        DomainError::ConstraintViolations(violations) => problem(
            StatusCode::UNPROCESSABLE_ENTITY,
            ProblemType::Unprocessable,
            violations.to_string(),
            instance,
        ),
        err @ DomainError::EmailExists(_) => problem(
            StatusCode::UNPROCESSABLE_ENTITY,
            ProblemType::Unprocessable,
            err.to_string(),
            instance,
        ),
        err @ DomainError::VersionMissing => problem(
            StatusCode::PRECONDITION_REQUIRED,
            ProblemType::Precondition,
            err.to_string(),
            instance,
        ),
        err @ (DomainError::VersionOutdated(_) | DomainError::VersionMalformed(_)) => problem(
            StatusCode::PRECONDITION_FAILED,
            ProblemType::Precondition,
            err.to_string(),
            instance,
        ),
        DomainError::Storage(msg) => {
            tracing::error!(error = %msg, "storage failure");
            problem(
                StatusCode::INTERNAL_SERVER_ERROR,
                ProblemType::Internal,
                "storage failure",
                instance,
            )
        }
    }
}
