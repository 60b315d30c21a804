//! Feed narrowing logic: privacy visibility plus search/category filters.
//!
//! The handlers load a page of recipes from the database and narrow it
//! in memory with the pure functions here, so the policy is testable
//! without a database. Visibility always runs first; the search and
//! category filters compose by AND on whatever it lets through.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{PrivacyLevel, Recipe};

/// Wire-facing recipe shape shared by the list and detail endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub cuisine_type: Option<String>,
    pub meal_type: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub privacy_level: PrivacyLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeView {
    fn from(r: Recipe) -> Self {
        RecipeView {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            ingredients: r.ingredients.into_iter().flatten().collect(),
            instructions: r.instructions.into_iter().flatten().collect(),
            prep_time: r.prep_time,
            cook_time: r.cook_time,
            servings: r.servings,
            cuisine_type: r.cuisine_type,
            meal_type: r.meal_type,
            tags: r.tags.into_iter().flatten().collect(),
            image_url: r.image_url,
            source_url: r.source_url,
            privacy_level: r.privacy_level,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A recipe is visible iff it is public or the viewer owns it.
///
/// Protected recipes are intentionally owner-only for now: the
/// recipe_access table exists but no grant path populates or consults it.
pub fn is_visible(recipe: &RecipeView, viewer: Option<Uuid>) -> bool {
    recipe.privacy_level == PrivacyLevel::Public || viewer == Some(recipe.user_id)
}

/// Narrow a collection to the recipes the viewer may see.
pub fn visible(recipes: Vec<RecipeView>, viewer: Option<Uuid>) -> Vec<RecipeView> {
    recipes
        .into_iter()
        .filter(|r| is_visible(r, viewer))
        .collect()
}

/// Category selector for the feed. Parsed from the `category` query
/// parameter; anything that is not a known keyword or meal type is an
/// open-ended cuisine filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    All,
    MyRecipes,
    Public,
    MealType(String),
    Cuisine(String),
}

const MEAL_TYPES: &[&str] = &["breakfast", "lunch", "dinner", "snack", "dessert"];

impl Category {
    pub fn parse(raw: &str) -> Category {
        match raw {
            "all" => Category::All,
            "my-recipes" => Category::MyRecipes,
            "public" => Category::Public,
            m if MEAL_TYPES.contains(&m) => Category::MealType(m.to_string()),
            other => Category::Cuisine(other.to_string()),
        }
    }
}

/// Apply the search query and category selector, in that order.
/// A blank query is a pass-through; `Category::All` is a no-op.
pub fn apply(
    recipes: Vec<RecipeView>,
    query: &str,
    category: &Category,
    viewer: Option<Uuid>,
) -> Vec<RecipeView> {
    let needle = query.trim().to_lowercase();

    recipes
        .into_iter()
        .filter(|r| needle.is_empty() || matches_query(r, &needle))
        .filter(|r| matches_category(r, category, viewer))
        .collect()
}

/// Case-insensitive substring match over title, description, tags,
/// cuisine type, and ingredients. `needle` must already be lowercased.
fn matches_query(recipe: &RecipeView, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&recipe.title)
        || recipe.description.as_deref().is_some_and(contains)
        || recipe.tags.iter().any(|t| contains(t))
        || recipe.cuisine_type.as_deref().is_some_and(contains)
        || recipe.ingredients.iter().any(|i| contains(i))
}

fn matches_category(recipe: &RecipeView, category: &Category, viewer: Option<Uuid>) -> bool {
    match category {
        Category::All => true,
        Category::MyRecipes => viewer == Some(recipe.user_id),
        Category::Public => recipe.privacy_level == PrivacyLevel::Public,
        Category::MealType(meal) => recipe.meal_type.as_deref() == Some(meal.as_str()),
        Category::Cuisine(cuisine) => recipe.cuisine_type.as_deref() == Some(cuisine.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(owner: Uuid, title: &str, privacy: PrivacyLevel) -> RecipeView {
        let now = Utc::now();
        RecipeView {
            id: Uuid::new_v4(),
            user_id: owner,
            title: title.to_string(),
            description: None,
            ingredients: vec![],
            instructions: vec![],
            prep_time: None,
            cook_time: None,
            servings: None,
            cuisine_type: None,
            meal_type: None,
            tags: vec![],
            image_url: None,
            source_url: None,
            privacy_level: privacy,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_public_recipes_visible_to_everyone() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let r = recipe(owner, "Minestrone", PrivacyLevel::Public);

        assert!(is_visible(&r, Some(stranger)));
        assert!(is_visible(&r, Some(owner)));
        assert!(is_visible(&r, None));
    }

    #[test]
    fn test_private_recipes_visible_only_to_owner() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let r = recipe(owner, "Secret sauce", PrivacyLevel::Private);

        assert!(is_visible(&r, Some(owner)));
        assert!(!is_visible(&r, Some(stranger)));
        assert!(!is_visible(&r, None));
    }

    #[test]
    fn test_protected_recipes_are_owner_only() {
        // No grant mechanism exists yet, so protected behaves like private.
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let r = recipe(owner, "Family gravy", PrivacyLevel::Protected);

        assert!(is_visible(&r, Some(owner)));
        assert!(!is_visible(&r, Some(stranger)));
    }

    #[test]
    fn test_visible_keeps_public_and_owned_and_nothing_else() {
        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();
        let collection = vec![
            recipe(other, "public by other", PrivacyLevel::Public),
            recipe(other, "private by other", PrivacyLevel::Private),
            recipe(other, "protected by other", PrivacyLevel::Protected),
            recipe(viewer, "private by viewer", PrivacyLevel::Private),
            recipe(viewer, "protected by viewer", PrivacyLevel::Protected),
        ];

        let titles: Vec<String> = visible(collection, Some(viewer))
            .into_iter()
            .map(|r| r.title)
            .collect();

        assert_eq!(
            titles,
            vec![
                "public by other",
                "private by viewer",
                "protected by viewer"
            ]
        );
    }

    #[test]
    fn test_absent_viewer_sees_only_public() {
        let owner = Uuid::new_v4();
        let collection = vec![
            recipe(owner, "pub", PrivacyLevel::Public),
            recipe(owner, "priv", PrivacyLevel::Private),
        ];

        let result = visible(collection, None);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "pub");
    }

    #[test]
    fn test_empty_query_is_pass_through() {
        let owner = Uuid::new_v4();
        let collection = vec![
            recipe(owner, "One", PrivacyLevel::Public),
            recipe(owner, "Two", PrivacyLevel::Public),
        ];

        let result = apply(collection, "   ", &Category::All, Some(owner));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_query_matches_cuisine_type() {
        let owner = Uuid::new_v4();
        let mut italian = recipe(owner, "Carbonara", PrivacyLevel::Public);
        italian.cuisine_type = Some("italian".to_string());
        let other = recipe(owner, "Pad thai", PrivacyLevel::Public);

        let result = apply(vec![italian, other], "italian", &Category::All, Some(owner));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Carbonara");
    }

    #[test]
    fn test_query_is_case_insensitive_and_checks_all_fields() {
        let owner = Uuid::new_v4();

        let mut by_title = recipe(owner, "Chicken Soup", PrivacyLevel::Public);
        by_title.description = Some("warming".to_string());

        let mut by_description = recipe(owner, "Stew", PrivacyLevel::Public);
        by_description.description = Some("slow-cooked CHICKEN thighs".to_string());

        let mut by_tag = recipe(owner, "Pot pie", PrivacyLevel::Public);
        by_tag.tags = vec!["chicken".to_string()];

        let mut by_ingredient = recipe(owner, "Fried rice", PrivacyLevel::Public);
        by_ingredient.ingredients = vec!["2 chicken breasts".to_string()];

        let miss = recipe(owner, "Beet salad", PrivacyLevel::Public);

        let result = apply(
            vec![by_title, by_description, by_tag, by_ingredient, miss],
            "Chicken",
            &Category::All,
            Some(owner),
        );
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_my_recipes_ignores_privacy_level() {
        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();
        let collection = vec![
            recipe(viewer, "mine public", PrivacyLevel::Public),
            recipe(viewer, "mine private", PrivacyLevel::Private),
            recipe(other, "theirs", PrivacyLevel::Public),
        ];

        let result = apply(collection, "", &Category::MyRecipes, Some(viewer));
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| r.user_id == viewer));
    }

    #[test]
    fn test_public_category_matches_privacy_not_ownership() {
        let viewer = Uuid::new_v4();
        let collection = vec![
            recipe(viewer, "mine private", PrivacyLevel::Private),
            recipe(viewer, "mine public", PrivacyLevel::Public),
        ];

        let result = apply(collection, "", &Category::Public, Some(viewer));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "mine public");
    }

    #[test]
    fn test_meal_type_category() {
        let owner = Uuid::new_v4();
        let mut pancakes = recipe(owner, "Pancakes", PrivacyLevel::Public);
        pancakes.meal_type = Some("breakfast".to_string());
        let mut tacos = recipe(owner, "Tacos", PrivacyLevel::Public);
        tacos.meal_type = Some("dinner".to_string());

        let result = apply(
            vec![pancakes, tacos],
            "",
            &Category::parse("breakfast"),
            Some(owner),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Pancakes");
    }

    #[test]
    fn test_unknown_category_filters_by_cuisine() {
        let owner = Uuid::new_v4();
        let mut thai = recipe(owner, "Green curry", PrivacyLevel::Public);
        thai.cuisine_type = Some("thai".to_string());
        let mut french = recipe(owner, "Cassoulet", PrivacyLevel::Public);
        french.cuisine_type = Some("french".to_string());

        // "thai" is not a fixed filter keyword, so it falls through to cuisine.
        let result = apply(
            vec![thai, french],
            "",
            &Category::parse("thai"),
            Some(owner),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Green curry");
    }

    #[test]
    fn test_query_and_category_compose_with_and() {
        let owner = Uuid::new_v4();
        let mut a = recipe(owner, "Chicken parm", PrivacyLevel::Public);
        a.cuisine_type = Some("italian".to_string());
        let mut b = recipe(owner, "Chicken satay", PrivacyLevel::Public);
        b.cuisine_type = Some("thai".to_string());
        let mut c = recipe(owner, "Margherita", PrivacyLevel::Public);
        c.cuisine_type = Some("italian".to_string());

        let result = apply(
            vec![a, b, c],
            "chicken",
            &Category::Cuisine("italian".to_string()),
            Some(owner),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Chicken parm");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("all"), Category::All);
        assert_eq!(Category::parse("my-recipes"), Category::MyRecipes);
        assert_eq!(Category::parse("public"), Category::Public);
        assert_eq!(
            Category::parse("dessert"),
            Category::MealType("dessert".to_string())
        );
        assert_eq!(
            Category::parse("mexican"),
            Category::Cuisine("mexican".to_string())
        );
        // Meal types the filter bar never surfaces still fall to cuisine.
        assert_eq!(
            Category::parse("appetizer"),
            Category::Cuisine("appetizer".to_string())
        );
    }

    #[test]
    fn test_feed_end_to_end_owner_vs_stranger() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let collection = vec![
            recipe(alice, "shared lasagna", PrivacyLevel::Public),
            recipe(alice, "secret lasagna", PrivacyLevel::Private),
        ];

        let as_bob = apply(
            visible(collection.clone(), Some(bob)),
            "",
            &Category::All,
            Some(bob),
        );
        assert_eq!(as_bob.len(), 1);
        assert_eq!(as_bob[0].title, "shared lasagna");

        let as_alice = apply(
            visible(collection, Some(alice)),
            "",
            &Category::All,
            Some(alice),
        );
        assert_eq!(as_alice.len(), 2);
    }
}
