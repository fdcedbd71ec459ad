use crate::{
    authentication::permissions::{ActionType, Identity},
    constants::RECIPES_LIMIT_DEFAULT,
    error::{Error, QueryError},
    schema::{Id, SubscriptionInfo, UserProfile},
};

use super::{count_author_recipes, get_user, get_user_profile, list_author_recipes};

use sqlx::{Pool, Postgres};

pub async fn is_subscribed(
    user_id: Id,
    author_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result: Option<(Id,)> =
        sqlx::query_as("SELECT id FROM subscriptions WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .fetch_optional(pool)
            .await
            .map_err(QueryError::from)?;

    Ok(result.is_some())
}

/// Follows `author_id` and returns the author as the caller now sees them.
pub async fn subscribe(
    identity: Identity,
    author_id: Id,
    pool: &Pool<Postgres>,
) -> Result<UserProfile, Error> {
    let user_id = identity.authenticate(ActionType::ManageSubscriptions)?;
    if user_id == author_id {
        return Err(Error::SelfSubscription);
    }

    if get_user(author_id, pool).await?.is_none() {
        return Err(Error::NotFound("User"));
    }

    if is_subscribed(user_id, author_id, pool).await? {
        return Err(already_subscribed());
    }

    // A concurrent subscribe can still win between the check and here,
    // unique_subscription settles it.
    let result = sqlx::query(
        "INSERT INTO subscriptions (user_id, author_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(author_id)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(already_subscribed());
    }

    log::debug!("User {user_id} subscribed to {author_id}");

    get_user_profile(identity, author_id, pool).await
}

pub async fn unsubscribe(
    identity: Identity,
    author_id: Id,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let user_id = identity.authenticate(ActionType::ManageSubscriptions)?;
    if get_user(author_id, pool).await?.is_none() {
        return Err(Error::NotFound("User"));
    }

    let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::AssociationNotFound(String::from(
            "You are not subscribed to this author",
        )));
    }

    log::debug!("User {user_id} unsubscribed from {author_id}");

    Ok(())
}

/// Authors the caller follows, each with their newest `recipes_limit` recipes.
pub async fn list_subscriptions(
    identity: Identity,
    recipes_limit: Option<i64>,
    pool: &Pool<Postgres>,
) -> Result<Vec<SubscriptionInfo>, Error> {
    let user_id = identity.authenticate(ActionType::ManageSubscriptions)?;
    let limit = recipes_limit.unwrap_or(RECIPES_LIMIT_DEFAULT).max(0);

    let authors: Vec<UserProfile> = sqlx::query_as(
        "
        SELECT u.id, u.email, u.username, u.first_name, u.last_name, TRUE AS is_subscribed
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.author_id
        WHERE s.user_id = $1
        ORDER BY s.id DESC
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    let mut subscriptions = Vec::with_capacity(authors.len());
    for author in authors {
        let recipes = list_author_recipes(author.id, limit, pool).await?;
        let recipes_count = count_author_recipes(author.id, pool).await?;
        subscriptions.push(SubscriptionInfo {
            author,
            recipes,
            recipes_count,
        });
    }

    Ok(subscriptions)
}

fn already_subscribed() -> Error {
    Error::AlreadyExists(String::from("You are already subscribed to this author"))
}
