use crate::util::rfc3339_utc;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;
use time::UtcDateTime;

pub const EMAIL_MIN_LEN: usize = 6;
pub const EMAIL_MAX_LEN: usize = 64;
pub const USERNAME_MAX_LEN: usize = 50;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

/// A user's primary identity. Posts, bookings, favorites and reviews all
/// reference users by email.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The email address is invalid: {0}")]
pub struct InvalidEmailError(String);

impl Email {
    pub fn new(email: String) -> Result<Self, InvalidEmailError> {
        let len = email.chars().count();
        let well_formed = (EMAIL_MIN_LEN..=EMAIL_MAX_LEN).contains(&len)
            && !email.chars().any(char::is_whitespace)
            && email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));

        if well_formed {
            Ok(Self(email))
        } else {
            Err(InvalidEmailError(email))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Email::new(inner).map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Email"))
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The username is invalid: {0}")]
pub struct InvalidUsernameError(String);

impl Username {
    pub fn new(username: String) -> Result<Self, InvalidUsernameError> {
        let len = username.chars().count();
        if (1..=USERNAME_MAX_LEN).contains(&len) && !username.chars().any(char::is_whitespace) {
            Ok(Self(username))
        } else {
            Err(InvalidUsernameError(username))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Username::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Username"))
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct User {
    pub email: Email,
    pub username: Username,
    pub telegram_username: Option<String>,
    #[serde(with = "rfc3339_utc")]
    pub created_at: UtcDateTime,
    #[serde(with = "rfc3339_utc")]
    pub updated_at: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct CreateUser {
    pub email: Email,
    pub username: Username,
    pub telegram_username: Option<String>,
}

/// Sparse profile update. Absent fields are left untouched.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct UserPatch {
    pub username: Option<Username>,
    pub telegram_username: Option<String>,
}

impl UserPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.telegram_username.is_none()
    }
}

/// Profile view joined with the average rating of reviews the user received.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct UserWithRating {
    #[serde(flatten)]
    pub user: User,
    pub rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        let too_long = "a@b.c".repeat(20);
        let legal = ["alice@x.com", "a@b.co", "bob.smith@mail.example.org"];
        let illegal = [
            "",
            "@x.com",
            too_long.as_str(),
            "no-at-sign.com",
            "with space@x.com",
            "a@b",
        ];

        for email in legal {
            assert!(Email::new(email.to_owned()).is_ok(), "{email}");
        }
        for email in illegal {
            assert!(Email::new(email.to_owned()).is_err(), "{email}");
        }
    }

    #[test]
    fn username_validation() {
        assert!(Username::new("bob".to_owned()).is_ok());
        assert!(Username::new(String::new()).is_err());
        assert!(Username::new("has space".to_owned()).is_err());
        assert!(Username::new("x".repeat(USERNAME_MAX_LEN + 1)).is_err());
    }
}
