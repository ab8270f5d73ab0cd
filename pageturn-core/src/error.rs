use crate::store::StoreError;
use thiserror::Error;

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

/// Failure classification surfaced to callers of the service layer.
///
/// Domain-rule violations are client-fixable; [`ServiceError::Database`] and
/// [`ServiceError::Internal`] are the only infrastructure variants and do
/// not leak backend details.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("User not found")]
    UserNotFound,
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("Post not found")]
    PostNotFound,
    #[error("Place does not exist")]
    PlaceNotFound,
    #[error("Post is not available")]
    PostIsNotAvailable,
    #[error("User is the owner of the post")]
    UserIsOwner,
    #[error("User is not the owner of the post")]
    UserIsNotOwner,
    #[error("User is not the booker of the post")]
    UserIsNotBooker,
    #[error("Booking already exists")]
    BookingAlreadyExists,
    #[error("Booking not found")]
    BookingNotFound,
    #[error("User is trying to review himself")]
    SelfReview,
    #[error("Database internal error")]
    Database(#[source] StoreError),
    #[error("Internal server error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Database(value)
    }
}
