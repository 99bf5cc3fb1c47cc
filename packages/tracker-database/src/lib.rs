#![deny(unused_crate_dependencies)]

use sqlx::{pool::PoolConnection, postgres::PgConnectOptions, Error as SqlxError};
use std::str::FromStr;
use thiserror::Error;
use tracker_lib::{config::DatabaseConfig, utils::attempt_database_connection};

pub mod postgres;
mod source;

pub use source::*;

#[derive(Debug, Error)]
pub enum TrackerDatabaseError {
    #[error("Invalid connection string: {0:?}")]
    InvalidConnectionString(String),
    #[error("Database backend not supported: {0:?}")]
    BackendNotSupported(String),
    #[error("Error from sqlx: {0:#?}")]
    SqlxError(#[from] SqlxError),
}

#[derive(Debug)]
pub enum TrackerConnection {
    Postgres(Box<PoolConnection<sqlx::Postgres>>),
}

#[derive(Clone, Debug)]
pub enum TrackerConnectionPool {
    Postgres(sqlx::Pool<sqlx::Postgres>),
}

impl TrackerConnectionPool {
    pub async fn connect(
        database_url: &str,
    ) -> Result<TrackerConnectionPool, TrackerDatabaseError> {
        let url = url::Url::parse(database_url).map_err(|_| {
            TrackerDatabaseError::InvalidConnectionString(database_url.into())
        })?;
        match url.scheme() {
            "postgres" | "postgresql" => {
                let options = PgConnectOptions::from_str(database_url)?;
                let pool = attempt_database_connection(|| {
                    sqlx::postgres::PgPoolOptions::new().connect_with(options.clone())
                })
                .await?;

                Ok(TrackerConnectionPool::Postgres(pool))
            }
            err => Err(TrackerDatabaseError::BackendNotSupported(err.into())),
        }
    }

    pub async fn from_config(
        config: &DatabaseConfig,
    ) -> Result<TrackerConnectionPool, TrackerDatabaseError> {
        Self::connect(&config.to_string()).await
    }

    pub async fn is_connected(&self) -> sqlx::Result<bool> {
        match self {
            TrackerConnectionPool::Postgres(p) => {
                let mut conn = p.acquire().await?;
                postgres::ping(&mut conn).await
            }
        }
    }

    pub async fn acquire(&self) -> sqlx::Result<TrackerConnection> {
        match self {
            TrackerConnectionPool::Postgres(p) => {
                Ok(TrackerConnection::Postgres(Box::new(p.acquire().await?)))
            }
        }
    }
}
