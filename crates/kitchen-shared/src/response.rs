//! Response envelopes. Every body carries `success`.

use serde::{Deserialize, Serialize};

use crate::dto::PaginationDto;

/// Successful response carrying a single payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// One page of results plus its pagination envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PaginationDto,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: PaginationDto) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

/// Body-less success, e.g. after a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorDto {
    pub field: String,
    pub message: String,
}

/// Error body shared by every failing route: `{success: false, message, errors?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldErrorDto>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldErrorDto>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn not_found(entity: &str) -> Self {
        Self::new(format!("{} not found", entity))
    }

    pub fn server_error() -> Self {
        Self::new("Server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_omits_empty_errors() {
        let body = serde_json::to_value(ErrorResponse::not_found("Recipe")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Recipe not found"})
        );
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let body = serde_json::to_value(
            ErrorResponse::new("Validation failed").with_errors(vec![FieldErrorDto {
                field: "name".to_string(),
                message: "Recipe name must be between 2 and 100 characters".to_string(),
            }]),
        )
        .unwrap();
        assert_eq!(body["errors"][0]["field"], "name");
    }
}
