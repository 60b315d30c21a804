use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::feed::{self, Category, RecipeView};
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::recipes;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Newest-first page the feed works from. Filtering happens in memory on
/// top of this page, matching how the original client consumed its store.
const FEED_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Free-text search over title, description, tags, cuisine type, and
    /// ingredients. Case-insensitive substring; blank means no filter.
    pub q: Option<String>,
    /// Category selector: "all", "my-recipes", "public", a meal type
    /// (breakfast/lunch/dinner/snack/dessert), or any cuisine string.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeView>,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Recipes visible to the viewer, newest first", body = ListRecipesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<Recipe> = match recipes::table
        .filter(recipes::deleted_at.is_null())
        .order(recipes::created_at.desc())
        .limit(FEED_PAGE_SIZE)
        .select(Recipe::as_select())
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let collection: Vec<RecipeView> = rows.into_iter().map(RecipeView::from).collect();

    let category = Category::parse(params.category.as_deref().unwrap_or("all"));
    let query = params.q.unwrap_or_default();

    let recipes = feed::apply(
        feed::visible(collection, Some(user.id)),
        &query,
        &category,
        Some(user.id),
    );

    (StatusCode::OK, Json(ListRecipesResponse { recipes })).into_response()
}
