use crate::api::recipes::find_visible_recipe;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{Comment, NewComment};
use crate::schema::comments;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentRecord {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub author_email: String,
    pub content: String,
    /// Threading parent; carried in the schema but unused by the current UI.
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentRecord {
    fn from(c: Comment) -> Self {
        CommentRecord {
            id: c.id,
            recipe_id: c.recipe_id,
            user_id: c.user_id,
            author_email: c.author_email,
            content: c.content,
            parent_id: c.parent_id,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListCommentsResponse {
    /// Newest first; the database order is authoritative.
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddCommentRequest {
    pub content: String,
}

/// Trim the comment body; whitespace-only input means "nothing to post".
fn clean_content(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/comments",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Comments for the recipe, newest first", body = ListCommentsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_comments(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    match find_visible_recipe(&mut conn, id, user.id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    let rows: Vec<Comment> = match comments::table
        .filter(comments::recipe_id.eq(id))
        .order(comments::created_at.desc())
        .select(Comment::as_select())
        .load(&mut conn)
    {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to fetch comments: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch comments".to_string(),
                }),
            )
                .into_response();
        }
    };

    let comments = rows.into_iter().map(CommentRecord::from).collect();

    (StatusCode::OK, Json(ListCommentsResponse { comments })).into_response()
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/comments",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentRecord),
        (status = 204, description = "Blank comment; nothing stored"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_comment(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddCommentRequest>,
) -> impl IntoResponse {
    // Blank input is a no-op, not an error.
    let content = match clean_content(&request.content) {
        Some(c) => c,
        None => return StatusCode::NO_CONTENT.into_response(),
    };

    let mut conn = get_conn!(pool);

    match find_visible_recipe(&mut conn, id, user.id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    let new_comment = NewComment {
        recipe_id: id,
        user_id: user.id,
        author_email: &user.email,
        content: &content,
    };

    let comment: Comment = match diesel::insert_into(comments::table)
        .values(&new_comment)
        .returning(Comment::as_returning())
        .get_result(&mut conn)
    {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to save comment: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to save comment".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::CREATED, Json(CommentRecord::from(comment))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_content_trims() {
        assert_eq!(clean_content("  tasty!  "), Some("tasty!".to_string()));
    }

    #[test]
    fn test_clean_content_rejects_whitespace_only() {
        assert_eq!(clean_content(""), None);
        assert_eq!(clean_content("   \n\t "), None);
    }
}
