use std::time::{Duration, SystemTime};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mrental_types::claim::{Scoped, TimeLimited};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

const SECS_PER_HOUR: f64 = 3600.0;

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

/// Signed token together with the moment it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Whole seconds, same as `exp` claim in the token
    pub expires: SystemTime,
}

fn whole_seconds(t: SystemTime) -> SystemTime {
    match t.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => SystemTime::UNIX_EPOCH + Duration::from_secs(d.as_secs()),
        Err(_) => t,
    }
}

pub struct TokenManager {
    keys: Keys,
    default_validity: Duration,
    issuer: String,
    audience: String,
    header: Header,
    validation: Validation,
}

impl TokenManager {
    pub fn new(
        secret: impl AsRef<[u8]>,
        default_validity: Duration,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        let issuer = issuer.into();
        let audience = audience.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);
        validation.set_audience(&[&audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        let header = Header::new(Algorithm::HS256);
        Self {
            keys: Keys::new(secret),
            default_validity,
            issuer,
            audience,
            header,
            validation,
        }
    }

    /// Validity given in (possibly fractional) hours
    pub fn with_hours(
        secret: impl AsRef<[u8]>,
        hours: f64,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(Error::InvalidValidity("hours must be a positive number"));
        }
        let validity = Duration::try_from_secs_f64(hours * SECS_PER_HOUR)
            .map_err(|_| Error::InvalidValidity("hours out of range"))?;
        Ok(Self::new(secret, validity, issuer, audience))
    }

    pub fn issue<C>(&self, claims: C) -> Result<IssuedToken>
    where
        C: serde::Serialize + TimeLimited + Scoped,
    {
        let now = SystemTime::now();
        self.sign(claims, now, now + self.default_validity)
    }

    #[cfg(test)]
    pub fn issue_expired<C>(&self, claims: C) -> Result<IssuedToken>
    where
        C: serde::Serialize + TimeLimited + Scoped,
    {
        let now = SystemTime::now();
        self.sign(claims, now - 2 * self.default_validity, now - self.default_validity)
    }

    fn sign<C>(&self, mut claims: C, issued: SystemTime, expires: SystemTime) -> Result<IssuedToken>
    where
        C: serde::Serialize + TimeLimited + Scoped,
    {
        let expires = whole_seconds(expires);
        claims.set_scope(&self.issuer, &self.audience);
        claims.set_validity(issued, expires);
        let token = encode(&self.header, &claims, &self.keys.encoding)?;
        Ok(IssuedToken { token, expires })
    }

    pub fn validate<T>(&self, token: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let data = decode::<T>(token, &self.keys.decoding, &self.validation).inspect_err(|e| {
            debug!("Token rejected: {e}");
        })?;
        Ok(data.claims)
    }

    pub fn default_validity(&self) -> Duration {
        self.default_validity
    }
}
