use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use super::error::{Error, QueryError};
use crate::settings::Settings;

pub async fn connect(settings: &Settings) -> Result<Pool<Postgres>, Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await
        .map_err(QueryError::from)?;

    log::info!(
        "Connected to database with up to {} connections",
        settings.max_connections
    );

    Ok(pool)
}

pub async fn migrate(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(())
}
