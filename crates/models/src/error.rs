use thiserror::Error;

/// Errors raised by the catalogue core
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required input was missing or unusable
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A module, course or change request does not exist
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A form submission failed validation; holds one message per offending field
    #[error("validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// A stored snapshot could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A lifecycle transition was requested from the wrong state
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl CatalogError {
    pub fn module_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Module",
            id,
        }
    }

    pub fn course_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Course",
            id,
        }
    }

    pub fn change_request_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "ChangeRequest",
            id,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = CatalogError::course_not_found(7);
        assert_eq!(err.to_string(), "Course with id 7 not found");
    }

    #[test]
    fn test_validation_message_joins_all_entries() {
        let err = CatalogError::ValidationFailed(vec![
            "German title must not be empty".to_string(),
            "Degree program must not be empty".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: German title must not be empty; Degree program must not be empty"
        );
    }
}
