use crate::{
    authentication::permissions::Identity,
    error::{Error, QueryError},
    schema::{Id, User, UserProfile},
};

use sqlx::{Pool, Postgres};

pub async fn get_user(user_id: Id, pool: &Pool<Postgres>) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

/// Loads a user as seen by `viewer`; anonymous viewers are never subscribed.
pub async fn get_user_profile(
    viewer: Identity,
    user_id: Id,
    pool: &Pool<Postgres>,
) -> Result<UserProfile, Error> {
    let row: Option<UserProfile> = sqlx::query_as(
        "
        SELECT u.id, u.email, u.username, u.first_name, u.last_name,
            EXISTS (
                SELECT 1 FROM subscriptions s WHERE s.user_id = $2 AND s.author_id = u.id
            ) AS is_subscribed
        FROM users u
        WHERE u.id = $1
    ",
    )
    .bind(user_id)
    .bind(viewer.user_id())
    .fetch_optional(pool)
    .await
    .map_err(QueryError::from)?;

    row.ok_or(Error::NotFound("User"))
}
