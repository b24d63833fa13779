use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Pool};
use time::OffsetDateTime;
use tracing::debug;

use crate::{ChosenDB, Error, Lifecycle, ListingParams, MAX_LIMIT, error::Result};

const ENTITY: &str = "Movie";
const VALID_ORDER_FIELDS: &[&str] = &["id", "name", "created", "active", "genre_id"];

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateMovie {
    #[garde(length(chars, min = 1, max = 200), custom(crate::not_blank))]
    pub name: String,
    #[garde(skip)]
    pub genre_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateMovie {
    #[garde(skip)]
    pub id: i64,
    #[garde(length(chars, min = 1, max = 200), custom(crate::not_blank))]
    pub name: String,
    #[garde(skip)]
    pub genre_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Movie {
    pub id: i64,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[sqlx(rename = "active")]
    pub state: Lifecycle,
    pub genre_id: i64,
}

pub type MovieRepository = MovieRepositoryImpl<Pool<ChosenDB>>;

pub struct MovieRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> MovieRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + sqlx::Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Missing genre surfaces as foreign key violation
    pub async fn create(&self, payload: CreateMovie) -> Result<Movie> {
        let result =
            sqlx::query("INSERT INTO movie (name, created, active, genre_id) VALUES (?, ?, ?, ?)")
                .bind(&payload.name)
                .bind(OffsetDateTime::now_utc())
                .bind(Lifecycle::Active)
                .bind(payload.genre_id)
                .execute(&self.executor)
                .await?;

        let id = result.last_insert_rowid();
        debug!("Created movie {id} in genre {}", payload.genre_id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: UpdateMovie) -> Result<Movie> {
        let result = sqlx::query("UPDATE movie SET name = ?, genre_id = ? WHERE id = ?")
            .bind(&payload.name)
            .bind(payload.genre_id)
            .bind(id)
            .execute(&self.executor)
            .await?;

        if result.rows_affected() == 0 {
            Err(Error::not_found(ENTITY, id))
        } else {
            self.get(id).await
        }
    }

    pub async fn deactivate(&self, id: i64) -> Result<Movie> {
        let result = sqlx::query("UPDATE movie SET active = ? WHERE id = ?")
            .bind(Lifecycle::Inactive)
            .bind(id)
            .execute(&self.executor)
            .await?;

        if result.rows_affected() == 0 {
            Err(Error::not_found(ENTITY, id))
        } else {
            self.get(id).await
        }
    }

    pub async fn delete(&self, id: i64) -> Result<Movie> {
        let mut transaction = self.executor.begin().await?;
        let record = get(id, &mut *transaction).await?;
        sqlx::query("DELETE FROM movie WHERE id = ?")
            .bind(id)
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await?;
        Ok(record)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM movie")
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }

    pub async fn list_all(&self) -> Result<Vec<Movie>> {
        self.list(ListingParams::default()).await
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<Movie>> {
        let order = params.order_by_clause(VALID_ORDER_FIELDS)?;
        let sql = format!(
            "SELECT id, name, created, active, genre_id FROM movie {order} LIMIT ? OFFSET ?"
        );
        let records = sqlx::query_as::<_, Movie>(&sql)
            .bind(params.bounded_limit())
            .bind(params.offset)
            .fetch(&self.executor)
            .take(MAX_LIMIT)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    pub async fn get(&self, id: i64) -> Result<Movie> {
        get(id, &self.executor).await
    }

    pub async fn find(&self, id: i64) -> Result<Option<Movie>> {
        find(id, &self.executor).await
    }
}

pub(crate) async fn find<'c, E>(id: i64, executor: E) -> Result<Option<Movie>>
where
    E: Executor<'c, Database = ChosenDB>,
{
    let record = sqlx::query_as::<_, Movie>(
        "SELECT id, name, created, active, genre_id FROM movie WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(record)
}

async fn get<'c, E>(id: i64, executor: E) -> Result<Movie>
where
    E: Executor<'c, Database = ChosenDB>,
{
    find(id, executor)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, id))
}
