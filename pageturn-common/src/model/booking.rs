use crate::{
    model::{Id, post::PostMarker, user::Email},
    util::rfc3339_utc,
};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct BookingMarker;

/// A claim by one user on a post. At most one booking exists per post at
/// any time; the bookings table carries a unique key on the post reference.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Booking {
    pub id: Id<BookingMarker>,
    pub booker: Email,
    pub post_id: Id<PostMarker>,
    #[serde(with = "rfc3339_utc")]
    pub created_at: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct NewBooking {
    pub booker: Email,
    pub post_id: Id<PostMarker>,
    pub created_at: UtcDateTime,
}
