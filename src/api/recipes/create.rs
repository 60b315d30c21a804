use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipe, PrivacyLevel};
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: Option<String>,
    /// One ingredient per entry; blank entries are dropped.
    pub ingredients: Option<Vec<String>>,
    /// Ordered preparation steps; blank entries are dropped.
    pub instructions: Option<Vec<String>>,
    /// Minutes. Values that don't parse as a non-negative integer are
    /// treated as unset, not rejected.
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub servings: Option<String>,
    pub cuisine_type: Option<String>,
    pub meal_type: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Reference URL from a prior POST /api/images upload, if any.
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub privacy_level: PrivacyLevel,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRecipeResponse {
    pub id: Uuid,
}

/// Numeric form fields arrive as free text. Anything that isn't a
/// non-negative integer silently becomes unset.
fn parse_count(raw: Option<&str>) -> Option<i32> {
    raw?.trim().parse::<i32>().ok().filter(|n| *n >= 0)
}

/// Trim tags, drop blanks, and suppress duplicates preserving first-seen
/// order.
fn normalize_tags(raw: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

fn clean_entries(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn none_if_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// The one required field. Surrounding whitespace is not content, so a
/// whitespace-only title is rejected like an empty one.
fn validate_title(raw: &str) -> Option<&str> {
    let title = raw.trim();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = CreateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    let title = match validate_title(&request.title) {
        Some(t) => t,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Title cannot be empty".to_string(),
                }),
            )
                .into_response()
        }
    };

    let ingredients: Vec<Option<String>> = clean_entries(request.ingredients.unwrap_or_default())
        .into_iter()
        .map(Some)
        .collect();

    let instructions: Vec<Option<String>> = clean_entries(request.instructions.unwrap_or_default())
        .into_iter()
        .map(Some)
        .collect();

    let tags: Vec<Option<String>> = normalize_tags(&request.tags.unwrap_or_default())
        .into_iter()
        .map(Some)
        .collect();

    let description = none_if_blank(request.description);
    let cuisine_type = none_if_blank(request.cuisine_type);
    let meal_type = none_if_blank(request.meal_type);
    let image_url = none_if_blank(request.image_url);
    let source_url = none_if_blank(request.source_url);

    let new_recipe = NewRecipe {
        user_id: user.id,
        title,
        description: description.as_deref(),
        ingredients: &ingredients,
        instructions: &instructions,
        prep_time: parse_count(request.prep_time.as_deref()),
        cook_time: parse_count(request.cook_time.as_deref()),
        servings: parse_count(request.servings.as_deref()),
        cuisine_type: cuisine_type.as_deref(),
        meal_type: meal_type.as_deref(),
        tags: &tags,
        image_url: image_url.as_deref(),
        source_url: source_url.as_deref(),
        privacy_level: request.privacy_level,
    };

    let mut conn = get_conn!(pool);

    let recipe_id: Uuid = match diesel::insert_into(recipes::table)
        .values(&new_recipe)
        .returning(recipes::id)
        .get_result(&mut conn)
    {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::CREATED,
        Json(CreateRecipeResponse { id: recipe_id }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_accepts_plain_integers() {
        assert_eq!(parse_count(Some("30")), Some(30));
        assert_eq!(parse_count(Some(" 15 ")), Some(15));
        assert_eq!(parse_count(Some("0")), Some(0));
    }

    #[test]
    fn test_parse_count_drops_garbage_silently() {
        assert_eq!(parse_count(Some("abc")), None);
        assert_eq!(parse_count(Some("30 minutes")), None);
        assert_eq!(parse_count(Some("")), None);
        assert_eq!(parse_count(None), None);
    }

    #[test]
    fn test_parse_count_rejects_negatives() {
        assert_eq!(parse_count(Some("-5")), None);
    }

    #[test]
    fn test_normalize_tags_deduplicates() {
        let tags = normalize_tags(&["Spicy".to_string(), "Spicy".to_string()]);
        assert_eq!(tags, vec!["Spicy"]);
    }

    #[test]
    fn test_normalize_tags_drops_blanks_and_trims() {
        let tags = normalize_tags(&[
            "  quick  ".to_string(),
            "   ".to_string(),
            "".to_string(),
            "weeknight".to_string(),
        ]);
        assert_eq!(tags, vec!["quick", "weeknight"]);
    }

    #[test]
    fn test_normalize_tags_preserves_order() {
        let tags = normalize_tags(&[
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);
        assert_eq!(tags, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_validate_title_rejects_empty_and_whitespace() {
        assert_eq!(validate_title(""), None);
        assert_eq!(validate_title("   \t\n"), None);
    }

    #[test]
    fn test_validate_title_trims() {
        assert_eq!(validate_title("  Shakshuka  "), Some("Shakshuka"));
    }

    #[test]
    fn test_clean_entries_drops_blank_lines() {
        let entries = clean_entries(vec![
            "2 eggs".to_string(),
            "  ".to_string(),
            "1 cup flour".to_string(),
        ]);
        assert_eq!(entries, vec!["2 eggs", "1 cup flour"]);
    }
}
