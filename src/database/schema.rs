use serde::Serialize;

use super::error::ValidationError;

pub type Id = i32;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// A user as seen by another caller.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Id,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub id: Id,
    pub author_id: Id,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeSummary {
    pub id: Id,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// One ingredient of a recipe together with its amount.
/// `id` is the ingredient id, not the id of the quantity row.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredientLine {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeDetail {
    pub id: Id,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientLine>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionInfo {
    #[serde(flatten)]
    pub author: UserProfile,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

/// A single (ingredient, amount) row reachable from a user's shopping cart.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Tag slugs, a recipe matches when it carries any of them.
    pub tags: Vec<String>,
    pub author: Option<Id>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeFilter {
    /// Builds a filter from decoded query pairs such as
    /// `tags=breakfast&tags=dinner&author=3&is_favorited=1`.
    ///
    /// `tags` may repeat. Booleans take `1`/`0`/`true`/`false`, an empty
    /// value leaves the filter off. Unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut filter = Self::default();

        for (key, value) in pairs {
            let value = value.trim();
            match key.as_str() {
                "tags" if !value.is_empty() => filter.tags.push(value.to_owned()),
                "author" if !value.is_empty() => {
                    let author: Id = value.parse().map_err(|_| {
                        ValidationError::field("author", "A valid integer is required.")
                    })?;
                    filter.author = Some(author);
                }
                "is_favorited" => filter.is_favorited = parse_flag("is_favorited", value)?,
                "is_in_shopping_cart" => {
                    filter.is_in_shopping_cart = parse_flag("is_in_shopping_cart", value)?
                }
                _ => {}
            }
        }

        Ok(filter)
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        _ => Err(ValidationError::field(field, "Must be a valid boolean.")),
    }
}

/// The per-user recipe lists that share the add/remove/exists capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    pub fn table(&self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "shopping_cart",
        }
    }

    pub fn already_present_message(&self) -> &'static str {
        match self {
            RecipeList::Favorites => "Recipe is already in favorites",
            RecipeList::ShoppingCart => "Recipe is already in the shopping cart",
        }
    }

    pub fn missing_message(&self) -> &'static str {
        match self {
            RecipeList::Favorites => "Recipe is not in favorites",
            RecipeList::ShoppingCart => "Recipe is not in the shopping cart",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &[(&str, &str)]) -> Vec<(String, String)> {
        query
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn repeated_tags_are_collected() {
        let filter = RecipeFilter::from_pairs(pairs(&[
            ("tags", "breakfast"),
            ("tags", "lunch"),
            ("author", "3"),
        ]))
        .unwrap();

        assert_eq!(filter.tags, vec!["breakfast", "lunch"]);
        assert_eq!(filter.author, Some(3));
        assert!(!filter.is_favorited);
    }

    #[test]
    fn flags_accept_numbers_and_words() {
        let filter = RecipeFilter::from_pairs(pairs(&[
            ("is_favorited", "1"),
            ("is_in_shopping_cart", "true"),
        ]))
        .unwrap();
        assert!(filter.is_favorited);
        assert!(filter.is_in_shopping_cart);

        let filter = RecipeFilter::from_pairs(pairs(&[
            ("is_favorited", "0"),
            ("is_in_shopping_cart", "False"),
        ]))
        .unwrap();
        assert_eq!(filter, RecipeFilter::default());
    }

    #[test]
    fn bad_values_are_field_errors() {
        let error = RecipeFilter::from_pairs(pairs(&[("is_favorited", "maybe")])).unwrap_err();
        assert_eq!(error.field_name(), "is_favorited");

        let error = RecipeFilter::from_pairs(pairs(&[("author", "me")])).unwrap_err();
        assert_eq!(error.field_name(), "author");
    }

    #[test]
    fn empty_query_is_no_filter() {
        let filter = RecipeFilter::from_pairs(pairs(&[("tags", ""), ("page", "2")])).unwrap();
        assert_eq!(filter, RecipeFilter::default());
    }
}
