use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::filter::FilterError;

use super::collection::Collection;

/// Errors from the data-access layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Collections owned by the restaurant service.
pub const USERS: &str = "users";
pub const FOODS: &str = "foods";
pub const ORDERS: &str = "orders";
pub const REVIEWS: &str = "reviews";

pub const COLLECTIONS: [&str; 4] = [USERS, FOODS, ORDERS, REVIEWS];

/// Data-access context shared by every handler.
///
/// Wraps a single long-lived pool. `main` owns the lifecycle: it calls
/// [`Database::connect`] at startup and [`Database::close`] after shutdown.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = Self::build_connection_string(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&url)
            .await?;

        info!("Connected to database {}:{}/{}", config.host, config.port, config.name);
        Ok(Self { pool })
    }

    /// Pool that connects on first use. Lets the router be built without a
    /// reachable server.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = Self::build_connection_string(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(&url)?;
        Ok(Self { pool })
    }

    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(name, self.pool.clone())
    }

    pub fn users(&self) -> Collection {
        self.collection(USERS)
    }

    pub fn foods(&self) -> Collection {
        self.collection(FOODS)
    }

    pub fn orders(&self) -> Collection {
        self.collection(ORDERS)
    }

    pub fn reviews(&self) -> Collection {
        self.collection(REVIEWS)
    }

    /// Create every collection table if missing. Idempotent.
    pub async fn ensure_collections(&self) -> Result<(), DatabaseError> {
        for name in COLLECTIONS {
            self.collection(name).ensure_exists().await?;
        }
        info!("Collections ready: {}", COLLECTIONS.join(", "));
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    /// Explicit `DATABASE_URL` wins; otherwise the URL is assembled from the
    /// individual credentials.
    pub fn build_connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        if let Some(url) = &config.url {
            url::Url::parse(url).map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?;
            return Ok(url.clone());
        }

        let invalid = |what: &str| DatabaseError::InvalidDatabaseUrl(format!("invalid {}", what));

        let mut url = url::Url::parse("postgres://localhost").map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?;
        url.set_host(Some(&config.host)).map_err(|_| invalid("host"))?;
        url.set_port(Some(config.port)).map_err(|_| invalid("port"))?;
        if let Some(user) = &config.user {
            url.set_username(user).map_err(|_| invalid("user"))?;
        }
        if let Some(password) = &config.password {
            url.set_password(Some(password)).map_err(|_| invalid("password"))?;
        }
        url.set_path(&format!("/{}", config.name));
        Ok(url.into())
    }
}
