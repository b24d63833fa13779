use std::collections::HashMap;

use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Pool};
use time::OffsetDateTime;
use tracing::debug;

use crate::{ChosenDB, Error, Lifecycle, ListingParams, MAX_LIMIT, error::Result, movie::Movie};

const ENTITY: &str = "Genre";
const VALID_ORDER_FIELDS: &[&str] = &["id", "name", "created", "active"];

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateGenre {
    #[garde(length(chars, min = 1, max = 100), custom(crate::not_blank))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateGenre {
    #[garde(skip)]
    pub id: i64,
    #[garde(length(chars, min = 1, max = 100), custom(crate::not_blank))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Genre {
    pub id: i64,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[sqlx(rename = "active")]
    pub state: Lifecycle,
}

/// Genre with all its movies nested
#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenreWithMovies {
    pub id: i64,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    pub state: Lifecycle,
    pub movies: Vec<Movie>,
}

pub type GenreRepository = GenreRepositoryImpl<Pool<ChosenDB>>;

pub struct GenreRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> GenreRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateGenre) -> Result<Genre> {
        let result = sqlx::query("INSERT INTO genre (name, created, active) VALUES (?, ?, ?)")
            .bind(&payload.name)
            .bind(OffsetDateTime::now_utc())
            .bind(Lifecycle::Active)
            .execute(&self.executor)
            .await?;

        let id = result.last_insert_rowid();
        debug!("Created genre {id}");
        self.get(id).await
    }

    /// Overwrites name, creation time and state are kept
    pub async fn update(&self, id: i64, payload: UpdateGenre) -> Result<Genre> {
        let result = sqlx::query("UPDATE genre SET name = ? WHERE id = ?")
            .bind(&payload.name)
            .bind(id)
            .execute(&self.executor)
            .await?;

        if result.rows_affected() == 0 {
            Err(Error::not_found(ENTITY, id))
        } else {
            self.get(id).await
        }
    }

    pub async fn deactivate(&self, id: i64) -> Result<Genre> {
        let result = sqlx::query("UPDATE genre SET active = ? WHERE id = ?")
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

    /// Hard delete, movies of the genre are deleted too
    pub async fn delete(&self, id: i64) -> Result<Genre> {
        let mut transaction = self.executor.begin().await?;
        let record = get(id, &mut *transaction).await?;
        sqlx::query("DELETE FROM genre WHERE id = ?")
            .bind(id)
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await?;
        Ok(record)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM genre")
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }

    pub async fn list_all(&self) -> Result<Vec<Genre>> {
        self.list(ListingParams::default()).await
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<Genre>> {
        let order = params.order_by_clause(VALID_ORDER_FIELDS)?;
        let sql = format!("SELECT id, name, created, active FROM genre {order} LIMIT ? OFFSET ?");
        let records = sqlx::query_as::<_, Genre>(&sql)
            .bind(params.bounded_limit())
            .bind(params.offset)
            .fetch(&self.executor)
            .take(MAX_LIMIT)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    pub async fn list_with_movies(&self) -> Result<Vec<GenreWithMovies>> {
        let genres = self.list_all().await?;
        let movies = sqlx::query_as::<_, Movie>(
            "SELECT id, name, created, active, genre_id FROM movie ORDER BY id",
        )
        .fetch_all(&self.executor)
        .await?;
        let mut by_genre: HashMap<i64, Vec<Movie>> = HashMap::new();
        for movie in movies {
            by_genre.entry(movie.genre_id).or_default().push(movie);
        }

        let records = genres
            .into_iter()
            .map(|g| GenreWithMovies {
                movies: by_genre.remove(&g.id).unwrap_or_default(),
                id: g.id,
                name: g.name,
                created: g.created,
                state: g.state,
            })
            .collect();
        Ok(records)
    }

    pub async fn get(&self, id: i64) -> Result<Genre> {
        get(id, &self.executor).await
    }
}

async fn get<'c, E>(id: i64, executor: E) -> Result<Genre>
where
    E: Executor<'c, Database = ChosenDB>,
{
    sqlx::query_as::<_, Genre>("SELECT id, name, created, active FROM genre WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, id))
}
