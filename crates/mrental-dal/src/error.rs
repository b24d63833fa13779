pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("User password error: {0}")]
    UserPasswordError(#[from] argon2::password_hash::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User with email {0} already exists")]
    DuplicateEmail(String),

    #[error("Movies with ID {} do not exist", join_ids(.0))]
    UnknownMovies(Vec<i64>),

    #[error("Invalid order by field: {0}")]
    InvalidOrderByField(String),
}

pub(crate) fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    pub(crate) fn not_found(entity: &str, id: i64) -> Self {
        Error::RecordNotFound(format!("{entity} with ID {id}"))
    }

    /// Ids joined as single comma separated diagnostic, for `UnknownMovies`
    pub fn unknown_ids(&self) -> Option<String> {
        match self {
            Error::UnknownMovies(ids) => Some(join_ids(ids)),
            _ => None,
        }
    }
}
