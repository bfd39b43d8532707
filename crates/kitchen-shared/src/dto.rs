//! Data Transfer Objects - request/response bodies of the recipe API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ingredients as sent in a JSON body: an array, or text to be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngredientsField {
    List(Vec<String>),
    Text(String),
}

/// A numeric field that clients send either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl std::fmt::Display for NumberOrText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumberOrText::Number(n) => write!(f, "{}", n),
            NumberOrText::Text(s) => f.write_str(s),
        }
    }
}

/// JSON body accepted by create and update. Every field is optional so the
/// same shape serves partial updates; completeness is checked by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<IngredientsField>,
    pub steps: Option<String>,
    pub servings: Option<NumberOrText>,
    pub cooking_time: Option<NumberOrText>,
    pub cuisine_type: Option<String>,
    pub recipe_type: Option<String>,
    pub difficulty: Option<String>,
}

/// Public subset of a recipe's author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Commenter as shown next to a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommenterDto {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    /// `null` when the commenter no longer exists.
    pub user: Option<CommenterDto>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: String,
    pub image: Option<String>,
    pub servings: u32,
    pub cooking_time: u32,
    pub cuisine_type: String,
    pub recipe_type: String,
    pub difficulty: String,
    /// `null` when the author no longer exists.
    pub author: Option<AuthorDto>,
    pub likes: Vec<Uuid>,
    pub likes_count: u32,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Body of `PUT /recipes/{id}/like`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub success: bool,
    pub message: String,
    pub liked: bool,
    pub likes_count: u32,
}

/// Request body of `POST /recipes/{id}/comment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCreatedResponse {
    pub success: bool,
    pub message: String,
    pub comment: CommentResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_response_is_camel_case() {
        let body = serde_json::to_value(LikeResponse {
            success: true,
            message: "Recipe liked".to_string(),
            liked: true,
            likes_count: 3,
        })
        .unwrap();
        assert_eq!(body["likesCount"], 3);
        assert_eq!(body["liked"], true);
    }

    #[test]
    fn test_recipe_request_accepts_numbers_and_strings() {
        let request: RecipeRequest = serde_json::from_str(
            r#"{"servings": 4, "cookingTime": "30", "ingredients": ["salt", "pepper"]}"#,
        )
        .unwrap();
        assert_eq!(request.servings.unwrap().to_string(), "4");
        assert_eq!(request.cooking_time.unwrap().to_string(), "30");
        assert_eq!(
            request.ingredients,
            Some(IngredientsField::List(vec!["salt".to_string(), "pepper".to_string()]))
        );
        assert!(request.name.is_none());
    }

    #[test]
    fn test_comment_request_tolerates_missing_text() {
        let request: CommentRequest = serde_json::from_str("{}").unwrap();
        assert!(request.text.is_empty());
    }
}
