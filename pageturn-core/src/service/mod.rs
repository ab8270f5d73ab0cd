mod bookings;
mod places;
mod posts;
mod reviews;
mod users;

pub use bookings::BookingService;
pub use places::PlaceService;
pub use posts::PostService;
pub use reviews::ReviewService;
pub use users::UserService;
