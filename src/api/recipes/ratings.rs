use crate::api::recipes::find_visible_recipe;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRating, Rating};
use crate::schema::ratings;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RatingSummary {
    /// Arithmetic mean rounded to one decimal; 0 when there are no ratings.
    pub average: f64,
    pub count: usize,
    /// The viewer's own rating, if they have submitted one.
    pub viewer_rating: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RateRecipeRequest {
    /// Integer stars, 1 through 5.
    pub rating: i32,
}

/// Mean and count over rating values. Order-invariant; never divides by
/// zero.
fn aggregate(values: &[i32]) -> (f64, usize) {
    if values.is_empty() {
        return (0.0, 0);
    }
    let sum: i32 = values.iter().sum();
    let mean = sum as f64 / values.len() as f64;
    ((mean * 10.0).round() / 10.0, values.len())
}

fn summarize(all: &[Rating], viewer: Uuid) -> RatingSummary {
    let values: Vec<i32> = all.iter().map(|r| r.rating).collect();
    let (average, count) = aggregate(&values);
    let viewer_rating = all.iter().find(|r| r.user_id == viewer).map(|r| r.rating);
    RatingSummary {
        average,
        count,
        viewer_rating,
    }
}

fn load_summary(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    viewer: Uuid,
) -> Result<RatingSummary, diesel::result::Error> {
    let all: Vec<Rating> = ratings::table
        .filter(ratings::recipe_id.eq(recipe_id))
        .select(Rating::as_select())
        .load(conn)?;
    Ok(summarize(&all, viewer))
}

/// Insert or replace the viewer's rating. The unique (recipe_id, user_id)
/// pair is the conflict target, so a resubmission updates the existing
/// row in place and keeps its created_at.
fn save_rating(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    user_id: Uuid,
    value: i32,
) -> Result<(), diesel::result::Error> {
    let new_rating = NewRating {
        recipe_id,
        user_id,
        rating: value,
    };

    diesel::insert_into(ratings::table)
        .values(&new_rating)
        .on_conflict((ratings::recipe_id, ratings::user_id))
        .do_update()
        .set(ratings::rating.eq(value))
        .execute(conn)?;

    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/ratings",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Rating summary for the recipe", body = RatingSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_ratings(
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

    match load_summary(&mut conn, id, user.id) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch ratings: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch ratings".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}/ratings",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = RateRecipeRequest,
    responses(
        (status = 200, description = "Rating recorded; refreshed summary", body = RatingSummary),
        (status = 400, description = "Rating out of range", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn rate_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<RateRecipeRequest>,
) -> impl IntoResponse {
    if !(1..=5).contains(&request.rating) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Rating must be between 1 and 5".to_string(),
            }),
        )
            .into_response();
    }

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

    if let Err(e) = save_rating(&mut conn, id, user.id, request.rating) {
        tracing::error!("Failed to save rating: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to save rating".to_string(),
            }),
        )
            .into_response();
    }

    match load_summary(&mut conn, id, user.id) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch ratings: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch ratings".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rating(user_id: Uuid, value: i32) -> Rating {
        Rating {
            id: Uuid::new_v4(),
            recipe_id: Uuid::new_v4(),
            user_id,
            rating: value,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        assert_eq!(aggregate(&[]), (0.0, 0));
    }

    #[test]
    fn test_aggregate_mean_and_count() {
        assert_eq!(aggregate(&[4, 4, 4]), (4.0, 3));
        assert_eq!(aggregate(&[1, 2, 3, 4, 5]), (3.0, 5));
    }

    #[test]
    fn test_aggregate_rounds_to_one_decimal() {
        assert_eq!(aggregate(&[4, 5]), (4.5, 2));
        assert_eq!(aggregate(&[3, 4, 4]), (3.7, 3));
        assert_eq!(aggregate(&[1, 1, 2]), (1.3, 3));
    }

    #[test]
    fn test_aggregate_is_order_invariant() {
        let forward = aggregate(&[1, 3, 5, 2, 4]);
        let backward = aggregate(&[4, 2, 5, 3, 1]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_summarize_picks_out_viewer_rating() {
        let viewer = Uuid::new_v4();
        let all = vec![rating(Uuid::new_v4(), 5), rating(viewer, 3)];

        let summary = summarize(&all, viewer);
        assert_eq!(summary.average, 4.0);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.viewer_rating, Some(3));
    }

    #[test]
    fn test_summarize_without_viewer_rating() {
        let all = vec![rating(Uuid::new_v4(), 4)];
        let summary = summarize(&all, Uuid::new_v4());
        assert_eq!(summary.viewer_rating, None);
    }

    // Exercises the ON CONFLICT statement for real. Needs a database;
    // skipped when TEST_DATABASE_URL is not set.
    #[test]
    fn test_resubmitted_rating_replaces_the_existing_row() {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            return;
        };

        use crate::models::{NewRecipe, NewUser, PrivacyLevel};
        use crate::schema::{recipes, users};
        use diesel_migrations::MigrationHarness;

        let mut conn = PgConnection::establish(&url).unwrap();
        conn.run_pending_migrations(crate::db::MIGRATIONS).unwrap();
        conn.begin_test_transaction().unwrap();

        let user_id: Uuid = diesel::insert_into(users::table)
            .values(&NewUser {
                email: "rater@example.com",
                password_hash: "unused",
            })
            .returning(users::id)
            .get_result(&mut conn)
            .unwrap();

        let recipe_id: Uuid = diesel::insert_into(recipes::table)
            .values(&NewRecipe {
                user_id,
                title: "Toast",
                description: None,
                ingredients: &[],
                instructions: &[],
                prep_time: None,
                cook_time: None,
                servings: None,
                cuisine_type: None,
                meal_type: None,
                tags: &[],
                image_url: None,
                source_url: None,
                privacy_level: PrivacyLevel::Public,
            })
            .returning(recipes::id)
            .get_result(&mut conn)
            .unwrap();

        save_rating(&mut conn, recipe_id, user_id, 3).unwrap();

        let first: Rating = ratings::table
            .filter(ratings::recipe_id.eq(recipe_id))
            .select(Rating::as_select())
            .first(&mut conn)
            .unwrap();
        assert_eq!(first.rating, 3);

        save_rating(&mut conn, recipe_id, user_id, 5).unwrap();

        let all: Vec<Rating> = ratings::table
            .filter(ratings::recipe_id.eq(recipe_id))
            .select(Rating::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].rating, 5);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[0].created_at, first.created_at);
    }
}
