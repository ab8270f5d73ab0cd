//! Storage capabilities the services are written against. Implemented over
//! Postgres by `pageturn-db`; the test suite substitutes in-memory
//! implementations.

use async_trait::async_trait;
use pageturn_common::model::{
    Id,
    auth::{AuthTokenHash, Authentication},
    booking::{Booking, BookingMarker, NewBooking},
    place::{CreatePlace, Place, PlaceMarker},
    post::{CreatePost, Page, Post, PostFilter, PostMarker, PostPatch, PostStatus},
    review::{NewReview, Review},
    user::{Email, User, UserPatch, Username},
};
use thiserror::Error;
use time::UtcDateTime;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. For bookings this is the
    /// authoritative duplicate signal; the service-level existence check is
    /// only an optimization.
    #[error("A conflicting row already exists")]
    Conflict,
    #[error("Storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    #[must_use]
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn by_email(&self, email: &Email) -> Result<Option<User>>;
    async fn by_username(&self, username: &Username) -> Result<Option<User>>;
    async fn create(&self, user: &User) -> Result<()>;
    async fn update(&self, email: &Email, patch: &UserPatch, updated_at: UtcDateTime)
    -> Result<()>;
}

#[async_trait]
pub trait PlaceStore: Send + Sync {
    async fn all(&self) -> Result<Vec<Place>>;
    async fn by_id(&self, id: Id<PlaceMarker>) -> Result<Option<Place>>;
    async fn create(&self, place: &CreatePlace) -> Result<Place>;
    async fn delete(&self, id: Id<PlaceMarker>) -> Result<()>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fetches a post together with the `is_favorite` flag computed for
    /// `viewer`.
    async fn by_id(&self, id: Id<PostMarker>, viewer: &Email) -> Result<Option<Post>>;
    async fn create(
        &self,
        owner: &Email,
        post: &CreatePost,
        status: PostStatus,
        created_at: UtcDateTime,
    ) -> Result<Id<PostMarker>>;
    /// Applies a sparse listing-field update. Status is not reachable from
    /// here; it only moves through [`BookingStore`] transitions.
    async fn patch(&self, id: Id<PostMarker>, patch: &PostPatch) -> Result<()>;
    async fn delete(&self, id: Id<PostMarker>) -> Result<()>;
    /// Available posts not owned by `viewer`, newest first.
    async fn list_available(
        &self,
        viewer: &Email,
        filter: &PostFilter,
        page: Page,
    ) -> Result<Vec<Post>>;
    /// Case-insensitive title/author/genre search over available posts not
    /// owned by `viewer`.
    async fn search(&self, query: &str, viewer: &Email, page: Page) -> Result<Vec<Post>>;
    async fn list_owned(
        &self,
        owner: &Email,
        status: Option<PostStatus>,
        page: Page,
    ) -> Result<Vec<Post>>;
    async fn list_booked_by(&self, booker: &Email, page: Page) -> Result<Vec<Post>>;
    async fn set_summary(&self, id: Id<PostMarker>, summary: &str) -> Result<()>;
    async fn set_quote(&self, id: Id<PostMarker>, quote: &str) -> Result<()>;
    async fn add_favorite(&self, id: Id<PostMarker>, user: &Email) -> Result<()>;
    async fn remove_favorite(&self, id: Id<PostMarker>, user: &Email) -> Result<()>;
    async fn list_favorites(&self, user: &Email, page: Page) -> Result<Vec<Post>>;
}

/// Booking persistence plus the post-status state machine. Each transition
/// is a single atomic unit of work: a failure mid-transition must never
/// leave a booking row and a post status disagreeing with each other.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn by_post(&self, post_id: Id<PostMarker>) -> Result<Option<Booking>>;
    /// Inserts the booking and moves the post to `booked`. A second booking
    /// for the same post fails with [`StoreError::Conflict`].
    async fn book(&self, booking: &NewBooking) -> Result<()>;
    /// Moves the post back to `available` and deletes the booking.
    async fn cancel(&self, booking_id: Id<BookingMarker>, post_id: Id<PostMarker>) -> Result<()>;
    /// Moves the post to `taken` and deletes every booking referencing it.
    async fn take(&self, post_id: Id<PostMarker>) -> Result<()>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn create(&self, review: &NewReview) -> Result<()>;
    async fn for_user(&self, target: &Email, page: Page) -> Result<Vec<Review>>;
    async fn average_rating(&self, target: &Email) -> Result<Option<f64>>;
}

#[async_trait]
pub trait PushTokenStore: Send + Sync {
    async fn set(&self, email: &Email, token: &str) -> Result<()>;
    async fn by_email(&self, email: &Email) -> Result<Option<String>>;
}

#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn create(&self, auth: &Authentication) -> Result<()>;
    async fn by_token_hash(&self, hash: &AuthTokenHash) -> Result<Option<Authentication>>;
}
