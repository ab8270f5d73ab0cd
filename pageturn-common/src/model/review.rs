use crate::{
    model::{Id, user::Email},
    util::rfc3339_utc,
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;
use time::UtcDateTime;

pub const RATING_MIN: i16 = 1;
pub const RATING_MAX: i16 = 5;
pub const COMMENT_MAX_LEN: usize = 500;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct ReviewMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(i16);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The rating must be from {RATING_MIN} to {RATING_MAX}, got {0}")]
pub struct InvalidRatingError(i16);

impl Rating {
    #[must_use]
    pub fn new(rating: i16) -> Option<Self> {
        (RATING_MIN..=RATING_MAX).contains(&rating).then_some(Self(rating))
    }

    #[must_use]
    pub fn get(self) -> i16 {
        self.0
    }
}

impl TryFrom<i16> for Rating {
    type Error = InvalidRatingError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidRatingError(value))
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = i16::deserialize(deserializer)?;
        Rating::try_from(inner)
            .map_err(|_| Error::invalid_value(Unexpected::Signed(i64::from(inner)), &"Rating"))
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Comment(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The comment length must be at most {COMMENT_MAX_LEN}")]
pub struct InvalidCommentError(String);

impl Comment {
    pub fn new(comment: String) -> Result<Self, InvalidCommentError> {
        if comment.chars().count() <= COMMENT_MAX_LEN {
            Ok(Self(comment))
        } else {
            Err(InvalidCommentError(comment))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Comment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Comment::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Comment"))
    }
}

/// A rating one user leaves on another after a hand-over.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Review {
    pub id: Id<ReviewMarker>,
    pub target: Email,
    pub reviewer: Email,
    pub rating: Rating,
    pub comment: Comment,
    #[serde(with = "rfc3339_utc")]
    pub created_at: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct CreateReview {
    pub target: Email,
    pub rating: Rating,
    pub comment: Comment,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct NewReview {
    pub target: Email,
    pub reviewer: Email,
    pub rating: Rating,
    pub comment: Comment,
    pub created_at: UtcDateTime,
}
