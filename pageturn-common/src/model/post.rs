use crate::{
    model::{Id, place::PlaceMarker, user::Email},
    util::rfc3339_utc,
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// Availability of a listed book. The only legal transitions are driven by
/// booking operations: `Available -> Booked` (book), `Booked -> Available`
/// (cancel) and `-> Taken` (hand-over confirmed, terminal).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Available,
    Booked,
    Taken,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The post status is invalid: {0}")]
pub struct InvalidPostStatusError(String);

impl PostStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Available => "available",
            PostStatus::Booked => "booked",
            PostStatus::Taken => "taken",
        }
    }
}

impl Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = InvalidPostStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(PostStatus::Available),
            "booked" => Ok(PostStatus::Booked),
            "taken" => Ok(PostStatus::Taken),
            other => Err(InvalidPostStatusError(other.to_owned())),
        }
    }
}

/// A listed book.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub owner: Email,
    pub place_id: Id<PlaceMarker>,
    pub title: String,
    pub description: String,
    pub genre: String,
    pub author: String,
    pub publication_year: i32,
    pub publisher: String,
    pub condition: String,
    pub cover: String,
    pub pages_count: i32,
    pub images: Vec<String>,
    /// Generated book description, filled in asynchronously after creation.
    pub summary: Option<String>,
    /// Generated representative quote, filled in asynchronously after creation.
    pub quote: Option<String>,
    pub status: PostStatus,
    #[serde(with = "rfc3339_utc")]
    pub created_at: UtcDateTime,
    /// Whether the viewing user has favorited this post. Computed per
    /// request, not stored on the row.
    pub is_favorite: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
pub struct CreatePost {
    pub place_id: Id<PlaceMarker>,
    pub title: String,
    pub description: String,
    pub genre: String,
    pub author: String,
    pub publication_year: i32,
    pub publisher: String,
    pub condition: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub pages_count: i32,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Sparse update of a post's listing fields. Absent fields are left
/// untouched. Status is deliberately not patchable: it only moves through
/// the booking transitions, and unknown fields (a `status` key included)
/// are rejected at the boundary.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PostPatch {
    pub place_id: Option<Id<PlaceMarker>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub author: Option<String>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub condition: Option<String>,
    pub cover: Option<String>,
    pub pages_count: Option<i32>,
}

impl PostPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Filters for the browse listing. Unset fields do not constrain results.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct PostFilter {
    pub genre: Option<String>,
    pub condition: Option<String>,
    pub publication_year: Option<i32>,
    pub place_id: Option<Id<PlaceMarker>>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct Page {
    #[serde(default = "Page::default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl Page {
    const fn default_limit() -> u32 {
        20
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::default_limit(),
            offset: 0,
        }
    }
}
