use std::str::FromStr as _;

use futures::TryStreamExt as _;
use mrental_dal::{
    Error, Lifecycle, ListingParams, Order,
    genre::{CreateGenre, GenreRepositoryImpl, UpdateGenre},
    movie::{CreateMovie, MovieRepositoryImpl, UpdateMovie},
    rental::{CreateRental, MovieRef, RentalRepositoryImpl},
    user::{CreateUser, UserRepositoryImpl},
};
use mrental_types::general::ValidEmail;
use sqlx::{Executor, sqlite::SqliteConnectOptions};

const TEST_DATA: &str = r#"
INSERT INTO genre (id, name, created, active) VALUES (1, 'Drama', '2024-08-01T10:00:00Z', 1);
INSERT INTO genre (id, name, created, active) VALUES (2, 'Comedy', '2024-08-01T10:05:00Z', 1);
INSERT INTO genre (id, name, created, active) VALUES (3, 'Western', '2024-08-01T10:10:00Z', 0);

INSERT INTO movie (id, name, created, active, genre_id) VALUES (1, 'Ikiru', '2024-08-02T09:00:00Z', 1, 1);
INSERT INTO movie (id, name, created, active, genre_id) VALUES (2, 'Playtime', '2024-08-02T09:10:00Z', 1, 2);
INSERT INTO movie (id, name, created, active, genre_id) VALUES (3, 'Stalker', '2024-08-02T09:20:00Z', 1, 1);
"#;

async fn init_db() -> sqlx::Pool<sqlx::Sqlite> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    mrental_dal::MIGRATOR.run(&conn).await.unwrap();

    conn.execute_many(TEST_DATA)
        .try_collect::<Vec<_>>()
        .await
        .unwrap();

    conn
}

async fn count_rows(conn: &sqlx::Pool<sqlx::Sqlite>, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT count(*) FROM {table}"))
        .fetch_one(conn)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_genre_crud() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    let genre = repo
        .create(CreateGenre {
            name: "Film noir".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(genre.name, "Film noir");
    assert_eq!(genre.state, Lifecycle::Active);
    assert_eq!(repo.count().await.unwrap(), 4);

    let updated = repo
        .update(
            genre.id,
            UpdateGenre {
                id: genre.id,
                name: "Noir".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Noir");
    assert_eq!(updated.created, genre.created);
    assert_eq!(updated.state, Lifecycle::Active);

    let deactivated = repo.deactivate(genre.id).await.unwrap();
    assert_eq!(deactivated.state, Lifecycle::Inactive);
    let again = repo.deactivate(genre.id).await.unwrap();
    assert_eq!(again.state, Lifecycle::Inactive);
    assert_eq!(again.name, "Noir");

    let deleted = repo.delete(genre.id).await.unwrap();
    assert_eq!(deleted.id, genre.id);
    assert!(matches!(
        repo.get(genre.id).await,
        Err(Error::RecordNotFound(_))
    ));
    assert!(matches!(
        repo.delete(genre.id).await,
        Err(Error::RecordNotFound(_))
    ));
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_missing_genre() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    let update = UpdateGenre {
        id: 42,
        name: "Horror".to_string(),
    };
    assert!(matches!(
        repo.update(42, update).await,
        Err(Error::RecordNotFound(msg)) if msg == "Genre with ID 42"
    ));
    assert!(matches!(
        repo.deactivate(42).await,
        Err(Error::RecordNotFound(_))
    ));
}

#[tokio::test]
async fn test_genre_listing() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    let all = repo.list_all().await.unwrap();
    let names: Vec<_> = all.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Drama", "Comedy", "Western"]);
    assert_eq!(all[2].state, Lifecycle::Inactive);

    let params = ListingParams::new(1, 1).with_order(vec![Order::Asc("name".to_string())]);
    let page = repo.list(params).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "Drama");

    let params = ListingParams::default().with_order(vec![Order::Desc("created".to_string())]);
    let page = repo.list(params).await.unwrap();
    assert_eq!(page[0].name, "Western");

    let params = ListingParams::default().with_order(vec![Order::Asc("secret".to_string())]);
    assert!(matches!(
        repo.list(params).await,
        Err(Error::InvalidOrderByField(_))
    ));
}

#[tokio::test]
async fn test_genres_with_movies() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    let genres = repo.list_with_movies().await.unwrap();
    assert_eq!(genres.len(), 3);
    let drama: Vec<_> = genres[0].movies.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(drama, ["Ikiru", "Stalker"]);
    assert_eq!(genres[1].movies.len(), 1);
    assert!(genres[2].movies.is_empty());
}

#[tokio::test]
async fn test_genre_delete_cascades() {
    let conn = init_db().await;
    let genres = GenreRepositoryImpl::new(conn.clone());
    let movies = MovieRepositoryImpl::new(conn.clone());

    genres.delete(1).await.unwrap();
    assert_eq!(movies.count().await.unwrap(), 1);
    assert!(matches!(movies.get(1).await, Err(Error::RecordNotFound(_))));
    assert!(movies.find(3).await.unwrap().is_none());
}

#[tokio::test]
async fn test_movie_crud() {
    let conn = init_db().await;
    let repo = MovieRepositoryImpl::new(conn);

    let movie = repo
        .create(CreateMovie {
            name: "Rashomon".to_string(),
            genre_id: 1,
        })
        .await
        .unwrap();
    assert_eq!(movie.genre_id, 1);
    assert_eq!(movie.state, Lifecycle::Active);

    let updated = repo
        .update(
            movie.id,
            UpdateMovie {
                id: movie.id,
                name: "Rashomon (1950)".to_string(),
                genre_id: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.genre_id, 2);
    assert_eq!(updated.created, movie.created);

    let deactivated = repo.deactivate(movie.id).await.unwrap();
    assert_eq!(deactivated.state, Lifecycle::Inactive);

    let deleted = repo.delete(movie.id).await.unwrap();
    assert_eq!(deleted.name, "Rashomon (1950)");
    assert!(repo.find(movie.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_movie_unknown_genre() {
    let conn = init_db().await;
    let repo = MovieRepositoryImpl::new(conn);

    let res = repo
        .create(CreateMovie {
            name: "Orphan".to_string(),
            genre_id: 999,
        })
        .await;
    match res {
        Err(Error::DatabaseError(sqlx::Error::Database(e))) => {
            assert!(e.is_foreign_key_violation())
        }
        other => panic!("Unexpected result {other:?}"),
    }
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_rental_create() {
    let conn = init_db().await;
    let repo = RentalRepositoryImpl::new(conn.clone());

    let rental = repo
        .create(CreateRental {
            customer_tax_id: "12345678901".to_string(),
            movies: vec![MovieRef { id: 1 }, MovieRef { id: 2 }],
        })
        .await
        .unwrap();
    assert_eq!(rental.customer_tax_id, "12345678901");
    assert_eq!(rental.items.len(), 2);
    assert!(rental.items.iter().all(|i| i.rental_id == rental.id));
    let movie_ids: Vec<_> = rental.items.iter().map(|i| i.movie_id).collect();
    assert_eq!(movie_ids, [1, 2]);

    let loaded = repo.get(rental.id).await.unwrap();
    assert_eq!(loaded.items, rental.items);
    assert_eq!(loaded.rental_date, rental.rental_date);
    assert_eq!(count_rows(&conn, "rental_item").await, 2);
}

#[tokio::test]
async fn test_rental_duplicate_references() {
    let conn = init_db().await;
    let repo = RentalRepositoryImpl::new(conn.clone());

    let rental = repo
        .create(CreateRental {
            customer_tax_id: "999".to_string(),
            movies: vec![MovieRef { id: 3 }, MovieRef { id: 3 }],
        })
        .await
        .unwrap();
    assert_eq!(rental.items.len(), 2);
    assert_ne!(rental.items[0].id, rental.items[1].id);
    assert!(rental.items.iter().all(|i| i.movie_id == 3));
}

#[tokio::test]
async fn test_rental_unknown_movies() {
    let conn = init_db().await;
    let repo = RentalRepositoryImpl::new(conn.clone());

    let err = repo
        .create(CreateRental {
            customer_tax_id: "12345678901".to_string(),
            movies: vec![MovieRef { id: 1 }, MovieRef { id: 2 }, MovieRef { id: 999 }],
        })
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::UnknownMovies(ids) if ids == &[999]));
    assert_eq!(err.to_string(), "Movies with ID 999 do not exist");

    let err = repo
        .create(CreateRental {
            customer_tax_id: "12345678901".to_string(),
            movies: vec![
                MovieRef { id: 998 },
                MovieRef { id: 1 },
                MovieRef { id: 998 },
                MovieRef { id: 7 },
            ],
        })
        .await
        .unwrap_err();
    assert_eq!(err.unknown_ids().as_deref(), Some("998, 998, 7"));

    assert_eq!(count_rows(&conn, "rental").await, 0);
    assert_eq!(count_rows(&conn, "rental_item").await, 0);
}

#[tokio::test]
async fn test_rental_item_failure_rolls_back() {
    let conn = init_db().await;
    conn.execute(
        "CREATE TRIGGER reject_items BEFORE INSERT ON rental_item
         BEGIN SELECT RAISE(ABORT, 'items rejected'); END;",
    )
    .await
    .unwrap();
    let repo = RentalRepositoryImpl::new(conn.clone());

    let err = repo
        .create(CreateRental {
            customer_tax_id: "12345678901".to_string(),
            movies: vec![MovieRef { id: 1 }, MovieRef { id: 2 }],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DatabaseError(_)));

    assert_eq!(count_rows(&conn, "rental").await, 0);
    assert_eq!(count_rows(&conn, "rental_item").await, 0);
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_rental_listing() {
    let conn = init_db().await;
    let repo = RentalRepositoryImpl::new(conn);

    for (tax_id, movie) in [("111", 1), ("222", 2), ("333", 3)] {
        repo.create(CreateRental {
            customer_tax_id: tax_id.to_string(),
            movies: vec![MovieRef { id: movie }],
        })
        .await
        .unwrap();
    }

    let all = repo.list_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].items[0].movie_id, 2);

    let params =
        ListingParams::new(0, 2).with_order(vec![Order::Desc("customer_tax_id".to_string())]);
    let page = repo.list(params).await.unwrap();
    let tax_ids: Vec<_> = page.iter().map(|r| r.customer_tax_id.as_str()).collect();
    assert_eq!(tax_ids, ["333", "222"]);
    assert_eq!(page[0].items[0].movie_id, 3);

    assert!(matches!(repo.get(42).await, Err(Error::RecordNotFound(_))));
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_users() {
    let conn = init_db().await;
    let repo = UserRepositoryImpl::new(conn);

    let payload = CreateUser {
        email: ValidEmail::from_str("Rita@Example.com").unwrap(),
        password: "Secret#1".to_string(),
    };
    let user = repo.create(payload.clone()).await.unwrap();
    assert_eq!(user.email, "rita@example.com");

    assert!(matches!(
        repo.create(payload).await,
        Err(Error::DuplicateEmail(email)) if email == "rita@example.com"
    ));

    let checked = repo
        .check_password("rita@example.com", "Secret#1")
        .await
        .unwrap();
    assert_eq!(checked.id, user.id);
    assert!(matches!(
        repo.check_password("rita@example.com", "secret#1").await,
        Err(Error::InvalidCredentials)
    ));
    assert!(matches!(
        repo.check_password("nobody@example.com", "Secret#1").await,
        Err(Error::InvalidCredentials)
    ));

    let found = repo.find_by_email("rita@example.com").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));
}
