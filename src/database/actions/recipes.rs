use std::collections::HashSet;

use crate::{
    authentication::permissions::{ActionType, Identity},
    draft::RecipeDraft,
    error::{Error, QueryError, ValidationError},
    schema::{Id, Recipe, RecipeDetail, RecipeFilter, RecipeList, RecipeSummary},
};

use super::{get_user_profile, is_in_list, list_recipe_ingredients, list_recipe_tags};

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

pub async fn get_recipe(id: Id, pool: &Pool<Postgres>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

/// Loads a recipe the caller is allowed to change, i.e. one they wrote.
pub async fn get_recipe_mut(
    identity: Identity,
    id: Id,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    let user_id = identity.authenticate(ActionType::ManageOwnRecipes)?;

    match get_recipe(id, pool).await? {
        Some(recipe) if recipe.author_id == user_id => Ok(recipe),
        Some(_) => Err(Error::Forbidden(String::from(
            "Only the author can change this recipe",
        ))),
        None => Err(Error::NotFound("Recipe")),
    }
}

pub async fn create_recipe(
    identity: Identity,
    draft: RecipeDraft,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    let author_id = identity.authenticate(ActionType::CreateRecipes)?;
    draft.validate()?;

    let mut tx = pool.begin().await.map_err(QueryError::from)?;

    ensure_references_exist(&draft, &mut tx).await?;

    let recipe: Recipe = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, text, cooking_time, image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
    ",
    )
    .bind(author_id)
    .bind(&draft.name)
    .bind(&draft.text)
    .bind(draft.cooking_time)
    .bind(&draft.image)
    .fetch_one(&mut *tx)
    .await
    .map_err(QueryError::from)?;

    insert_associations(recipe.id, &draft, &mut tx).await?;

    tx.commit().await.map_err(QueryError::from)?;

    log::info!(
        "User {author_id} created recipe {} with {} ingredients",
        recipe.id,
        draft.ingredients.len()
    );

    Ok(recipe)
}

/// Replaces a recipe's fields, tags and ingredients in one transaction.
///
/// Associations are always cleared and inserted again, never diffed.
/// A missing image keeps the stored one.
pub async fn update_recipe(
    identity: Identity,
    id: Id,
    draft: RecipeDraft,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    get_recipe_mut(identity, id, pool).await?;
    draft.validate()?;

    let mut tx = pool.begin().await.map_err(QueryError::from)?;

    ensure_references_exist(&draft, &mut tx).await?;

    let recipe: Option<Recipe> = sqlx::query_as(
        "
        UPDATE recipes SET
        name = $1,
        text = $2,
        cooking_time = $3,
        image = COALESCE($4, image)
        WHERE id = $5
        RETURNING *
    ",
    )
    .bind(&draft.name)
    .bind(&draft.text)
    .bind(draft.cooking_time)
    .bind(&draft.image)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(QueryError::from)?;

    // Deleted between the ownership check and the update.
    let recipe = recipe.ok_or(Error::NotFound("Recipe"))?;

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(QueryError::from)?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(QueryError::from)?;

    insert_associations(id, &draft, &mut tx).await?;

    tx.commit().await.map_err(QueryError::from)?;

    log::info!("Recipe {id} updated by its author {}", recipe.author_id);

    Ok(recipe)
}

pub async fn delete_recipe(identity: Identity, id: Id, pool: &Pool<Postgres>) -> Result<(), Error> {
    let recipe = get_recipe_mut(identity, id, pool).await?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe.id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    log::info!("Recipe {id} deleted by its author {}", recipe.author_id);

    Ok(())
}

async fn ensure_references_exist(
    draft: &RecipeDraft,
    conn: &mut PgConnection,
) -> Result<(), Error> {
    let tags = draft.unique_tags();
    let found: Vec<(Id,)> = sqlx::query_as("SELECT id FROM tags WHERE id = ANY($1)")
        .bind(&tags)
        .fetch_all(&mut *conn)
        .await
        .map_err(QueryError::from)?;
    if let Some(id) = first_missing(&tags, &found) {
        return Err(missing_reference("tags", id).into());
    }

    let ingredients: Vec<Id> = draft.ingredients.iter().map(|i| i.id).collect();
    if ingredients.is_empty() {
        return Ok(());
    }
    let found: Vec<(Id,)> = sqlx::query_as("SELECT id FROM ingredients WHERE id = ANY($1)")
        .bind(&ingredients)
        .fetch_all(&mut *conn)
        .await
        .map_err(QueryError::from)?;
    if let Some(id) = first_missing(&ingredients, &found) {
        return Err(missing_reference("ingredients", id).into());
    }

    Ok(())
}

fn first_missing(wanted: &[Id], found: &[(Id,)]) -> Option<Id> {
    let found: HashSet<Id> = found.iter().map(|row| row.0).collect();
    wanted.iter().copied().find(|id| !found.contains(id))
}

fn missing_reference(field: &str, id: Id) -> ValidationError {
    ValidationError::field(
        field,
        format!("Invalid pk \"{id}\" - object does not exist."),
    )
}

async fn insert_associations(
    recipe_id: Id,
    draft: &RecipeDraft,
    conn: &mut PgConnection,
) -> Result<(), Error> {
    if !draft.ingredients.is_empty() {
        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");

        query_builder.push_values(draft.ingredients.iter(), |mut b, ingredient| {
            b.push_bind(recipe_id)
                .push_bind(ingredient.id)
                .push_bind(ingredient.amount);
        });

        query_builder
            .build()
            .execute(&mut *conn)
            .await
            .map_err(QueryError::from)?;
    }

    let tags = draft.unique_tags();
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");

    query_builder.push_values(tags.iter(), |mut b, tag_id| {
        b.push_bind(recipe_id).push_bind(*tag_id);
    });

    query_builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    Ok(())
}

pub async fn get_recipe_detail(
    viewer: Identity,
    id: Id,
    pool: &Pool<Postgres>,
) -> Result<RecipeDetail, Error> {
    let recipe = get_recipe(id, pool).await?.ok_or(Error::NotFound("Recipe"))?;
    recipe_detail(viewer, recipe, pool).await
}

async fn recipe_detail(
    viewer: Identity,
    recipe: Recipe,
    pool: &Pool<Postgres>,
) -> Result<RecipeDetail, Error> {
    let tags = list_recipe_tags(recipe.id, pool).await?;
    let author = get_user_profile(viewer, recipe.author_id, pool).await?;
    let ingredients = list_recipe_ingredients(recipe.id, pool).await?;

    let (is_favorited, is_in_shopping_cart) = match viewer.user_id() {
        Some(user_id) => (
            is_in_list(RecipeList::Favorites, user_id, recipe.id, pool).await?,
            is_in_list(RecipeList::ShoppingCart, user_id, recipe.id, pool).await?,
        ),
        None => (false, false),
    };

    Ok(RecipeDetail {
        id: recipe.id,
        tags,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

/// Lists recipes newest first. List filters only apply to signed-in viewers.
pub async fn list_recipes(
    viewer: Identity,
    filter: &RecipeFilter,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeDetail>, Error> {
    let mut query_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT r.* FROM recipes r WHERE TRUE");

    if !filter.tags.is_empty() {
        query_builder
            .push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id WHERE rt.recipe_id = r.id AND t.slug = ANY(",
            )
            .push_bind(filter.tags.clone())
            .push("))");
    }

    if let Some(author) = filter.author {
        query_builder.push(" AND r.author_id = ").push_bind(author);
    }

    if let Some(user_id) = viewer.user_id() {
        for (enabled, list) in [
            (filter.is_favorited, RecipeList::Favorites),
            (filter.is_in_shopping_cart, RecipeList::ShoppingCart),
        ] {
            if enabled {
                query_builder
                    .push(format!(
                        " AND EXISTS (SELECT 1 FROM {} l WHERE l.recipe_id = r.id AND l.user_id = ",
                        list.table()
                    ))
                    .push_bind(user_id)
                    .push(")");
            }
        }
    }

    query_builder.push(" ORDER BY r.id DESC");

    let recipes: Vec<Recipe> = query_builder
        .build_query_as::<Recipe>()
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    let mut details = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        details.push(recipe_detail(viewer, recipe, pool).await?);
    }

    Ok(details)
}

pub async fn list_author_recipes(
    author_id: Id,
    limit: i64,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeSummary>, Error> {
    let rows: Vec<RecipeSummary> = sqlx::query_as(
        "SELECT id, name, image, cooking_time FROM recipes WHERE author_id = $1 ORDER BY id DESC LIMIT $2",
    )
    .bind(author_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn count_author_recipes(author_id: Id, pool: &Pool<Postgres>) -> Result<i64, Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(count.0)
}
