use jsonwebtoken::errors::Error as JwtError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
    #[error("Invalid token validity: {0}")]
    InvalidValidity(&'static str),
}

impl Error {
    /// True when token was well formed and signed, but is past its expiry
    pub fn is_expired(&self) -> bool {
        use jsonwebtoken::errors::ErrorKind;
        matches!(self, Error::JwtError(e) if matches!(e.kind(), ErrorKind::ExpiredSignature))
    }
}
