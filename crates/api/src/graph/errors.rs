use serde::Serialize;

use supplyhub_core::{DomainError, NotFoundTarget};

/// Error classification as exposed to graph clients.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GraphErrorType {
    NotFound,
    BadRequest,
    Precondition,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphError {
    pub error_type: GraphErrorType,
    pub message: String,
    /// Argument path, e.g. `["input", "manager", "salary"]`. Empty when the
    /// error is not tied to one argument.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

pub type GraphResult<T> = Result<T, Vec<GraphError>>;

impl GraphError {
    pub fn new(error_type: GraphErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn at<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }
}

/// One graph error per problem; violations fan out into one error each.
pub fn from_domain(err: DomainError) -> Vec<GraphError> {
    match err {
        DomainError::NotFound(NotFoundTarget::Id(id)) => vec![GraphError::new(
            GraphErrorType::NotFound,
            format!("no supplier with id {id} found"),
        )],
        DomainError::NotFound(NotFoundTarget::Criteria(criteria)) => vec![GraphError::new(
            GraphErrorType::NotFound,
            format!("no supplier found for criteria {criteria}"),
        )],
        DomainError::ConstraintViolations(violations) => violations
            .into_iter()
            .map(|v| {
                let mut path = vec!["input".to_string()];
                path.extend(v.path_segments());
                GraphError::new(GraphErrorType::BadRequest, v.message).at(path)
            })
            .collect(),
        DomainError::EmailExists(email) => vec![GraphError::new(
            GraphErrorType::BadRequest,
            format!("email address {email} already exists"),
        )
        .at(["input", "email"])],
        err @ (DomainError::VersionOutdated(_)
        | DomainError::VersionMissing
        | DomainError::VersionMalformed(_)) => {
            vec![GraphError::new(GraphErrorType::Precondition, err.to_string()).at(["version"])]
        }
        DomainError::Storage(msg) => {
            tracing::error!(error = %msg, "storage failure");
            vec![GraphError::new(GraphErrorType::Internal, "storage failure")]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supplyhub_core::validation::{Rule, Violation};
    use supplyhub_core::{SearchCriteria, SupplierId, Violations};

    #[test]
    fn each_violation_becomes_one_bad_request() {
        let violations: Violations = [
            Violation::new("name", Rule::Pattern, "must be capitalized"),
            Violation::new("deliveries[1].article", Rule::Pattern, "must be capitalized"),
        ]
        .into_iter()
        .collect();

        let errors = from_domain(DomainError::ConstraintViolations(violations));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.error_type == GraphErrorType::BadRequest));
        assert!(errors.iter().any(|e| e.path == ["input", "name"]));
        assert!(errors
            .iter()
            .any(|e| e.path == ["input", "deliveries", "1", "article"]));
    }

    #[test]
    fn email_conflict_points_at_the_email_argument() {
        let errors = from_domain(DomainError::EmailExists("a@acme.de".into()));
        assert_eq!(errors[0].error_type, GraphErrorType::BadRequest);
        assert_eq!(errors[0].path, ["input", "email"]);
    }

    #[test]
    fn lookups_map_to_not_found() {
        for err in [
            DomainError::not_found_id(SupplierId::new()),
            DomainError::not_found_criteria(SearchCriteria::new().with("name", "x")),
        ] {
            assert_eq!(from_domain(err)[0].error_type, GraphErrorType::NotFound);
        }
    }

    #[test]
    fn error_type_serializes_in_graph_style() {
        let json = serde_json::to_value(GraphError::new(GraphErrorType::NotFound, "x")).unwrap();
        assert_eq!(json["error_type"], "NOT_FOUND");
        assert!(json.get("path").is_none());
    }
}
