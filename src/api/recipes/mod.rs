pub mod comments;
pub mod create;
pub mod get;
pub mod list;
pub mod ratings;

use crate::feed::{self, RecipeView};
use crate::models::Recipe;
use crate::schema::recipes;
use crate::AppState;
use axum::routing::get;
use axum::Router;
use diesel::prelude::*;
use utoipa::OpenApi;
use uuid::Uuid;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route("/{id}", get(get::get_recipe))
        .route(
            "/{id}/ratings",
            get(ratings::get_ratings).put(ratings::rate_recipe),
        )
        .route(
            "/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
}

/// Load a recipe the viewer is allowed to see. `Ok(None)` covers missing,
/// soft-deleted, and not-visible alike so handlers can't leak existence.
pub(crate) fn find_visible_recipe(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    viewer: Uuid,
) -> Result<Option<RecipeView>, diesel::result::Error> {
    let recipe: Recipe = match recipes::table
        .filter(recipes::id.eq(recipe_id))
        .filter(recipes::deleted_at.is_null())
        .select(Recipe::as_select())
        .first(conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => return Ok(None),
        Err(e) => return Err(e),
    };

    let view = RecipeView::from(recipe);
    if feed::is_visible(&view, Some(viewer)) {
        Ok(Some(view))
    } else {
        Ok(None)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        ratings::get_ratings,
        ratings::rate_recipe,
        comments::list_comments,
        comments::add_comment,
    ),
    components(schemas(
        crate::feed::RecipeView,
        crate::models::PrivacyLevel,
        create::CreateRecipeRequest,
        create::CreateRecipeResponse,
        list::ListRecipesResponse,
        ratings::RatingSummary,
        ratings::RateRecipeRequest,
        comments::CommentRecord,
        comments::ListCommentsResponse,
        comments::AddCommentRequest,
    ))
)]
pub struct ApiDoc;
