use std::time::SystemTime;

use serde::{Deserialize, Serialize};

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub trait TimeLimited {
    fn set_validity(&mut self, issued: SystemTime, until: SystemTime);
    fn check_validity(&self) -> bool;
}

/// Claims that name who issued them and for whom.
pub trait Scoped {
    fn set_scope(&mut self, issuer: &str, audience: &str);
}

/// Claims carried by API bearer tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiClaim {
    /// Account email
    pub unique_name: String,
    pub iss: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

impl ApiClaim {
    /// Claim for user, scope and validity are filled in when the token is issued
    pub fn new_unsigned(unique_name: impl Into<String>) -> Self {
        ApiClaim {
            unique_name: unique_name.into(),
            iss: String::new(),
            aud: String::new(),
            iat: 0,
            exp: 0,
        }
    }
}

impl TimeLimited for ApiClaim {
    fn set_validity(&mut self, issued: SystemTime, until: SystemTime) {
        self.iat = unix_secs(issued);
        self.exp = unix_secs(until);
    }

    fn check_validity(&self) -> bool {
        self.exp > unix_secs(SystemTime::now())
    }
}

impl Scoped for ApiClaim {
    fn set_scope(&mut self, issuer: &str, audience: &str) {
        self.iss = issuer.to_string();
        self.aud = audience.to_string();
    }
}
