use std::collections::HashMap;

use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Pool, SqliteConnection};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::{ChosenDB, Error, ListingParams, error::Result, movie};

const ENTITY: &str = "Rental";
const VALID_ORDER_FIELDS: &[&str] = &["id", "customer_tax_id", "rental_date"];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MovieRef {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateRental {
    #[garde(length(chars, min = 1, max = 14), custom(crate::not_blank))]
    pub customer_tax_id: String,
    #[garde(length(min = 1))]
    pub movies: Vec<MovieRef>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RentalItem {
    pub id: i64,
    pub rental_id: i64,
    pub movie_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct RentalRow {
    id: i64,
    customer_tax_id: String,
    rental_date: OffsetDateTime,
}

impl RentalRow {
    fn with_items(self, items: Vec<RentalItem>) -> Rental {
        Rental {
            id: self.id,
            customer_tax_id: self.customer_tax_id,
            rental_date: self.rental_date,
            items,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Rental {
    pub id: i64,
    pub customer_tax_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub rental_date: OffsetDateTime,
    pub items: Vec<RentalItem>,
}

pub type RentalRepository = RentalRepositoryImpl<Pool<ChosenDB>>;

pub struct RentalRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> RentalRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Creates rental header and one item per requested movie reference.
    ///
    /// All references are checked first, unknown ones are reported together and nothing is written.
    /// Header and items are then written in a single transaction.
    pub async fn create(&self, payload: CreateRental) -> Result<Rental> {
        let mut unknown = Vec::new();
        for movie_ref in &payload.movies {
            if movie::find(movie_ref.id, &self.executor).await?.is_none() {
                unknown.push(movie_ref.id);
            }
        }
        if !unknown.is_empty() {
            let err = Error::UnknownMovies(unknown);
            debug!("Rental rejected: {err}");
            return Err(err);
        }

        let rental_date = OffsetDateTime::now_utc();
        let mut transaction = self.executor.begin().await?;
        let rental_id =
            sqlx::query("INSERT INTO rental (customer_tax_id, rental_date) VALUES (?, ?)")
                .bind(&payload.customer_tax_id)
                .bind(rental_date)
                .execute(&mut *transaction)
                .await?
                .last_insert_rowid();

        let mut items = Vec::with_capacity(payload.movies.len());
        for movie_ref in &payload.movies {
            let id = sqlx::query("INSERT INTO rental_item (rental_id, movie_id) VALUES (?, ?)")
                .bind(rental_id)
                .bind(movie_ref.id)
                .execute(&mut *transaction)
                .await?
                .last_insert_rowid();
            items.push(RentalItem {
                id,
                rental_id,
                movie_id: movie_ref.id,
            });
        }
        transaction.commit().await?;
        info!("Created rental {rental_id} with {} items", items.len());

        Ok(Rental {
            id: rental_id,
            customer_tax_id: payload.customer_tax_id,
            rental_date,
            items,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Rental> {
        let mut conn = self.executor.acquire().await?;
        get(id, &mut *conn).await
    }

    pub async fn list_all(&self) -> Result<Vec<Rental>> {
        self.list(ListingParams::default()).await
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<Rental>> {
        let order = params.order_by_clause(VALID_ORDER_FIELDS)?;
        let rentals_sql =
            format!("SELECT id, customer_tax_id, rental_date FROM rental {order} LIMIT ? OFFSET ?");
        let rentals = sqlx::query_as::<_, RentalRow>(&rentals_sql)
            .bind(params.bounded_limit())
            .bind(params.offset)
            .fetch_all(&self.executor)
            .await?;

        let items_sql = format!(
            "SELECT id, rental_id, movie_id FROM rental_item WHERE rental_id IN \
            (SELECT id FROM rental {order} LIMIT ? OFFSET ?) ORDER BY id"
        );
        let items = sqlx::query_as::<_, RentalItem>(&items_sql)
            .bind(params.bounded_limit())
            .bind(params.offset)
            .fetch_all(&self.executor)
            .await?;
        let mut by_rental: HashMap<i64, Vec<RentalItem>> = HashMap::new();
        for item in items {
            by_rental.entry(item.rental_id).or_default().push(item);
        }

        Ok(rentals
            .into_iter()
            .map(|r| {
                let items = by_rental.remove(&r.id).unwrap_or_default();
                r.with_items(items)
            })
            .collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM rental")
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }
}

async fn get(id: i64, conn: &mut SqliteConnection) -> Result<Rental> {
    let rental = sqlx::query_as::<_, RentalRow>(
        "SELECT id, customer_tax_id, rental_date FROM rental WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| Error::not_found(ENTITY, id))?;

    let items = sqlx::query_as::<_, RentalItem>(
        "SELECT id, rental_id, movie_id FROM rental_item WHERE rental_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rental.with_items(items))
}
