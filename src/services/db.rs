//! Database pool setup
//!
//! The pool is created lazily so the HTTP server comes up even when Postgres
//! is unreachable; requests then fail individually with a 500 until the
//! database is back. [`connect`] tries one connection at boot purely
//! to report its status.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use crate::domain::videos;

const MAX_CONNECTIONS: u32 = 5;

pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_lazy(database_url)?;

    match videos::ensure_table(&pool).await {
        Ok(()) => info!("Connected to db"),
        Err(e) => error!(error = %e, "Error occurred while connecting to db"),
    }

    Ok(pool)
}
