use pageturn_common::{
    model::{
        ModelValidationError,
        auth::Authentication,
        booking::Booking,
        place::Place,
        post::Post,
        review::{Comment, Rating, Review},
        user::{Email, User, Username},
    },
    util::PositiveDuration,
};
use time::{Duration, PrimitiveDateTime, UtcDateTime};

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct UserRecord {
    pub email: String,
    pub username: String,
    pub telegram_username: Option<String>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct PlaceRecord {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct PostRecord {
    pub id: i64,
    pub owner_email: String,
    pub place_id: i64,
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
    pub summary: Option<String>,
    pub quote: Option<String>,
    pub status: String,
    pub created_at: PrimitiveDateTime,
    pub is_favorite: bool,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct BookingRecord {
    pub id: i64,
    pub booker_email: String,
    pub post_id: i64,
    pub created_at: PrimitiveDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct ReviewRecord {
    pub id: i64,
    pub target_email: String,
    pub reviewer_email: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: PrimitiveDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct AuthenticationRecord {
    pub user_email: String,
    pub token_hash: Vec<u8>,
    pub created_at: PrimitiveDateTime,
    pub expires_after_seconds: Option<i64>,
}

pub(crate) fn to_primitive(date_time: UtcDateTime) -> PrimitiveDateTime {
    PrimitiveDateTime::new(date_time.date(), date_time.time())
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::new(value.email)?,
            username: Username::new(value.username)?,
            telegram_username: value.telegram_username,
            created_at: value.created_at.as_utc(),
            updated_at: value.updated_at.as_utc(),
        })
    }
}

impl From<PlaceRecord> for Place {
    fn from(value: PlaceRecord) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            address: value.address,
        }
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            owner: Email::new(value.owner_email)?,
            place_id: value.place_id.into(),
            title: value.title,
            description: value.description,
            genre: value.genre,
            author: value.author,
            publication_year: value.publication_year,
            publisher: value.publisher,
            condition: value.condition,
            cover: value.cover,
            pages_count: value.pages_count,
            images: value.images,
            summary: value.summary,
            quote: value.quote,
            status: value.status.parse()?,
            created_at: value.created_at.as_utc(),
            is_favorite: value.is_favorite,
        })
    }
}

impl TryFrom<BookingRecord> for Booking {
    type Error = ModelValidationError;

    fn try_from(value: BookingRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            booker: Email::new(value.booker_email)?,
            post_id: value.post_id.into(),
            created_at: value.created_at.as_utc(),
        })
    }
}

impl TryFrom<ReviewRecord> for Review {
    type Error = ModelValidationError;

    fn try_from(value: ReviewRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            target: Email::new(value.target_email)?,
            reviewer: Email::new(value.reviewer_email)?,
            rating: Rating::try_from(value.rating)?,
            comment: Comment::new(value.comment)?,
            created_at: value.created_at.as_utc(),
        })
    }
}

impl TryFrom<AuthenticationRecord> for Authentication {
    type Error = ModelValidationError;

    fn try_from(value: AuthenticationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::new(value.user_email)?,
            token_hash: value.token_hash.into_boxed_slice().try_into()?,
            created_at: value.created_at.as_utc(),
            expires_after: value
                .expires_after_seconds
                .map(|seconds| Duration::seconds(seconds).try_into())
                .transpose()?,
        })
    }
}
