use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{Result as HashResult, SaltString, rand_core::OsRng},
};

use garde::Validate;
use mrental_types::general::ValidEmail;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use time::OffsetDateTime;
use tracing::debug;

use crate::{Error, error::Result};

fn hash_password(password: &str) -> HashResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, password_hash: &str) -> HashResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let res = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    if let Err(e) = res {
        debug!("Invalid password, error {e}");
    }
    Ok(res.is_ok())
}

/// Requires at least one digit, lowercase, uppercase and non-alphanumeric character
pub fn password_policy<T: AsRef<str> + ?Sized>(password: &T, _ctx: &()) -> garde::Result {
    let password = password.as_ref();
    let mut missing = Vec::new();
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("digit");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        missing.push("lowercase letter");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        missing.push("uppercase letter");
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        missing.push("non-alphanumeric character");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "password must contain at least one {}",
            missing.join(", ")
        )))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateUser {
    #[garde(dive)]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "email"))]
    pub email: ValidEmail,
    #[garde(length(chars, min = 6, max = 255), custom(password_policy))]
    pub password: String,
}

/// New password for existing account, same rules as at registration
#[derive(Debug, Clone, Validate)]
pub struct NewPassword {
    #[garde(length(chars, min = 6, max = 255), custom(password_policy))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

pub type UserRepository = UserRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct UserRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> UserRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateUser) -> Result<User> {
        let password = hash_password(&payload.password)?;
        let email = payload.email.as_ref();
        let result = sqlx::query("INSERT INTO users (email, password, created) VALUES (?, ?, ?)")
            .bind(email)
            .bind(password)
            .bind(OffsetDateTime::now_utc())
            .execute(&self.executor)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    Error::DuplicateEmail(email.to_string())
                }
                e => Error::from(e),
            })?;

        let id = result.last_insert_rowid();
        debug!("Created user {id}");
        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT id, email, created FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::not_found("User", id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, email, created FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.executor)
            .await?;
        Ok(user)
    }

    pub async fn change_password(&self, email: &str, password: &str) -> Result<()> {
        let password = hash_password(password)?;
        let result = sqlx::query("UPDATE users SET password = ? WHERE email = ?")
            .bind(password)
            .bind(email)
            .execute(&self.executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("User with email {email}")));
        }
        Ok(())
    }

    /// Unknown email and wrong password are not distinguished
    pub async fn check_password(&self, email: &str, password: &str) -> Result<User> {
        let record: Option<(i64, String)> =
            sqlx::query_as("SELECT id, password FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.executor)
                .await?;
        if let Some((id, hashed_password)) = record {
            if verify_password(password, &hashed_password).unwrap_or(false) {
                return self.get(id).await;
            }
        }
        Err(Error::InvalidCredentials)
    }
}
