use std::{fmt::Display, str::FromStr};

use garde::Validate;
use serde::{Deserialize, Serialize};

/// Email address, trimmed and lowercased so lookups are case insensitive
#[derive(Debug, Clone, PartialEq, Eq, Validate, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[garde(transparent)]
pub struct ValidEmail(#[garde(email, length(max = 255))] String);

impl FromStr for ValidEmail {
    type Err = garde::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let email = ValidEmail(s.trim().to_lowercase());
        email.validate()?;
        Ok(email)
    }
}

impl TryFrom<String> for ValidEmail {
    type Error = garde::Report;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValidEmail> for String {
    fn from(value: ValidEmail) -> Self {
        value.0
    }
}

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ValidEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use fake::Fake as _;
    use quickcheck::Arbitrary;
    use quickcheck_macros::quickcheck;

    use super::*;

    #[derive(Debug, Clone)]
    struct FakeEmail(String);

    impl Arbitrary for FakeEmail {
        fn arbitrary(_g: &mut quickcheck::Gen) -> Self {
            let email: String = fake::faker::internet::en::SafeEmail().fake();
            FakeEmail(email)
        }
    }

    #[quickcheck]
    fn test_parsed_email_is_lowercase(email: FakeEmail) -> bool {
        let upper = email.0.to_uppercase();
        match ValidEmail::from_str(&upper) {
            Ok(parsed) => parsed.as_ref() == email.0.to_lowercase(),
            Err(_) => false,
        }
    }

    #[test]
    fn test_valid_email() {
        let email = ValidEmail::from_str("  John.Doe@Example.com ").unwrap();
        assert_eq!(email.as_ref(), "john.doe@example.com");
    }

    #[test]
    fn test_invalid_email() {
        let email = ValidEmail::from_str("john");
        assert!(email.is_err());

        let email = ValidEmail("john".to_string());
        assert!(email.validate().is_err());
    }

    #[test]
    fn test_email_serde() {
        let email: ValidEmail = serde_json::from_str(r#""ADMIN@localhost""#).unwrap();
        assert_eq!(email.to_string(), "admin@localhost");
        assert_eq!(serde_json::to_string(&email).unwrap(), r#""admin@localhost""#);

        let res = serde_json::from_str::<ValidEmail>(r#""not an email""#);
        assert!(res.is_err());
    }
}
