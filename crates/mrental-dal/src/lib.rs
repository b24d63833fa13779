pub mod error;
pub mod genre;
pub mod movie;
pub mod rental;
pub mod user;

use std::{fmt::Display, str::FromStr};

pub use error::Error;
use serde::{Deserialize, Serialize};
pub use sqlx::Error as SqlxError;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type Pool = sqlx::Pool<ChosenDB>;

pub const MAX_LIMIT: usize = 10_000;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Applies all pending migrations
pub async fn migrate(pool: &Pool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

pub async fn applied_migrations(pool: &Pool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT count(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Soft delete state of catalog records, stored as 1/0 in the `active` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum Lifecycle {
    Inactive = 0,
    Active = 1,
}

impl Lifecycle {
    pub fn is_active(&self) -> bool {
        matches!(self, Lifecycle::Active)
    }
}

pub(crate) fn not_blank<T: AsRef<str> + ?Sized>(value: &T, _ctx: &()) -> garde::Result {
    if value.as_ref().trim().is_empty() {
        Err(garde::Error::new("must not be blank"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Order {
    Asc(String),
    Desc(String),
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Asc(s) => write!(f, "{}", s),
            Order::Desc(s) => write!(f, "{} DESC", s),
        }
    }
}

impl AsRef<str> for Order {
    fn as_ref(&self) -> &str {
        match self {
            Order::Asc(s) => s.as_str(),
            Order::Desc(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingParams {
    pub offset: i64,
    pub limit: i64,
    pub order: Option<Vec<Order>>,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_LIMIT as i64,
            order: None,
        }
    }
}

impl ListingParams {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            order: None,
        }
    }
    pub fn with_order(mut self, order: Vec<Order>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn ordering(&self, valid_fields: &[&str]) -> Result<String> {
        let ordering = self
            .order
            .as_ref()
            .map(|o| {
                o.iter()
                    .map(|o| {
                        if valid_fields.contains(&o.as_ref()) {
                            Ok(o.to_string())
                        } else {
                            Err(Error::InvalidOrderByField(o.as_ref().to_string()))
                        }
                    })
                    .collect::<Result<Vec<String>>>()
                    .map(|o| o.join(", "))
            })
            .transpose()?
            .unwrap_or_default();
        Ok(ordering)
    }

    /// Full ORDER BY clause, records are ordered by id when no ordering was requested
    pub fn order_by_clause(&self, valid_fields: &[&str]) -> Result<String> {
        let ordering = self.ordering(valid_fields)?;
        if ordering.is_empty() {
            Ok("ORDER BY id".to_string())
        } else {
            Ok(format!("ORDER BY {ordering}, id"))
        }
    }

    pub(crate) fn bounded_limit(&self) -> i64 {
        self.limit.clamp(0, MAX_LIMIT as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_clause() {
        const FIELDS: &[&str] = &["id", "name", "created"];
        let params = ListingParams::default();
        assert_eq!(params.order_by_clause(FIELDS).unwrap(), "ORDER BY id");

        let params = ListingParams::default().with_order(vec![
            Order::Desc("created".to_string()),
            Order::Asc("name".to_string()),
        ]);
        assert_eq!(
            params.order_by_clause(FIELDS).unwrap(),
            "ORDER BY created DESC, name, id"
        );

        let params = ListingParams::default().with_order(vec![Order::Asc("password".into())]);
        assert!(matches!(
            params.order_by_clause(FIELDS),
            Err(Error::InvalidOrderByField(f)) if f == "password"
        ));
    }

    #[test]
    fn test_bounded_limit() {
        assert_eq!(ListingParams::new(0, 50).bounded_limit(), 50);
        assert_eq!(ListingParams::new(0, -1).bounded_limit(), 0);
        assert_eq!(
            ListingParams::new(0, i64::MAX).bounded_limit(),
            MAX_LIMIT as i64
        );
    }

    #[test]
    fn test_lifecycle_serde() {
        assert_eq!(
            serde_json::to_string(&Lifecycle::Inactive).unwrap(),
            r#""inactive""#
        );
        let state: Lifecycle = serde_json::from_str(r#""active""#).unwrap();
        assert!(state.is_active());
    }
}
