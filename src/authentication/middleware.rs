use warp::{reject::Rejection, Filter};

use crate::{
    error::Error,
    schema::{Id, RecipeFilter},
};

use super::{permissions::Identity, session::SessionKey};

const TOKEN_PREFIX: &str = "Token ";

fn identify(key: &SessionKey, header: Option<String>) -> Result<Identity, Error> {
    match header {
        None => Ok(Identity::Anonymous),
        Some(header) => match header.strip_prefix(TOKEN_PREFIX) {
            Some(token) => key.identify(token.trim()),
            None => Err(Error::Unauthorized),
        },
    }
}

/// Resolves the caller from `Authorization: Token <jwt>`; no header means anonymous.
pub fn with_identity(
    key: SessionKey,
) -> impl Filter<Extract = (Identity,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let key = key.clone();
        async move { identify(&key, header).map_err(Rejection::from) }
    })
}

/// Like [`with_identity`], but only lets authenticated callers through.
pub fn with_user(key: SessionKey) -> impl Filter<Extract = (Id,), Error = Rejection> + Clone {
    with_identity(key).and_then(|identity: Identity| async move {
        identity
            .user_id()
            .ok_or_else(|| Rejection::from(Error::Unauthorized))
    })
}

/// Parses recipe list filters from the query string, see [`RecipeFilter::from_pairs`].
pub fn with_recipe_filter() -> impl Filter<Extract = (RecipeFilter,), Error = Rejection> + Clone {
    warp::query::<Vec<(String, String)>>().and_then(|pairs: Vec<(String, String)>| async move {
        RecipeFilter::from_pairs(pairs).map_err(|e| Rejection::from(Error::from(e)))
    })
}
