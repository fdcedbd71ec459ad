use crate::{
    authentication::permissions::{ActionType, Identity},
    error::{Error, QueryError},
    schema::{CartLine, Id},
    shopping_list::{
        aggregate::ShoppingList,
        document::{ShoppingListDocument, ShoppingListFormat},
    },
};

use sqlx::{Pool, Postgres};

/// Every ingredient row reachable from the user's cart. Rows whose
/// recipe or ingredient reference was nulled out are skipped.
pub async fn list_cart_lines(user_id: Id, pool: &Pool<Postgres>) -> Result<Vec<CartLine>, Error> {
    let lines: Vec<CartLine> = sqlx::query_as(
        "
        SELECT i.name, i.measurement_unit, ri.amount
        FROM shopping_cart sc
        INNER JOIN recipes r ON r.id = sc.recipe_id
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = r.id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = $1
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(lines)
}

pub async fn shopping_list_for(
    identity: Identity,
    pool: &Pool<Postgres>,
) -> Result<ShoppingList, Error> {
    let user_id = identity.authenticate(ActionType::ManageOwnShoppingCart)?;
    let lines = list_cart_lines(user_id, pool).await?;
    let list = ShoppingList::from_lines(lines);

    log::debug!(
        "Shopping list for user {user_id} has {} entries",
        list.len()
    );

    Ok(list)
}

pub async fn download_shopping_list(
    identity: Identity,
    format: ShoppingListFormat,
    pool: &Pool<Postgres>,
) -> Result<ShoppingListDocument, Error> {
    let list = shopping_list_for(identity, pool).await?;
    ShoppingListDocument::render(&list, format)
}
