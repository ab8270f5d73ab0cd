use crate::server::ServerRouter;
use axum::Router;

mod bookings;
mod places;
mod posts;
mod reviews;
mod users;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(bookings::routes())
        .merge(places::routes())
        .merge(posts::routes())
        .merge(reviews::routes())
        .merge(users::routes())
}
