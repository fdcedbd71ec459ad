use crate::{
    authentication::permissions::{ActionType, Identity},
    error::{Error, QueryError},
    schema::{Id, RecipeList, RecipeSummary},
};

use super::get_recipe;

use sqlx::{Pool, Postgres};

fn list_action(list: RecipeList) -> ActionType {
    match list {
        RecipeList::Favorites => ActionType::ManageOwnFavorites,
        RecipeList::ShoppingCart => ActionType::ManageOwnShoppingCart,
    }
}

pub async fn is_in_list(
    list: RecipeList,
    user_id: Id,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result: Option<(Id,)> = sqlx::query_as(&format!(
        "SELECT recipe_id FROM {} WHERE user_id = $1 AND recipe_id = $2",
        list.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .fetch_optional(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(result.is_some())
}

/// Puts a recipe on the caller's list and returns its summary.
///
/// The unique constraint on (user, recipe) decides races: when the insert
/// affects no row the recipe was already there.
pub async fn add_to_list(
    list: RecipeList,
    identity: Identity,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<RecipeSummary, Error> {
    let user_id = identity.authenticate(list_action(list))?;
    let recipe = get_recipe(recipe_id, pool)
        .await?
        .ok_or(Error::NotFound("Recipe"))?;

    if is_in_list(list, user_id, recipe_id, pool).await? {
        return Err(Error::AlreadyExists(list.already_present_message().to_owned()));
    }

    let result = sqlx::query(&format!(
        "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        list.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::AlreadyExists(list.already_present_message().to_owned()));
    }

    log::debug!("User {user_id} added recipe {recipe_id} to {}", list.table());

    Ok(recipe.into())
}

pub async fn remove_from_list(
    list: RecipeList,
    identity: Identity,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let user_id = identity.authenticate(list_action(list))?;
    if get_recipe(recipe_id, pool).await?.is_none() {
        return Err(Error::NotFound("Recipe"));
    }

    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
        list.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::AssociationNotFound(list.missing_message().to_owned()));
    }

    log::debug!("User {user_id} removed recipe {recipe_id} from {}", list.table());

    Ok(())
}

pub async fn add_to_favorites(
    identity: Identity,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<RecipeSummary, Error> {
    add_to_list(RecipeList::Favorites, identity, recipe_id, pool).await
}

pub async fn remove_from_favorites(
    identity: Identity,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    remove_from_list(RecipeList::Favorites, identity, recipe_id, pool).await
}

pub async fn add_to_shopping_cart(
    identity: Identity,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<RecipeSummary, Error> {
    add_to_list(RecipeList::ShoppingCart, identity, recipe_id, pool).await
}

pub async fn remove_from_shopping_cart(
    identity: Identity,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    remove_from_list(RecipeList::ShoppingCart, identity, recipe_id, pool).await
}
