use crate::server::{Result, ServerError, ServerRouter, auth::AuthenticatedUser, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use pageturn_common::model::{Id, post::PostMarker};
use pageturn_core::service::BookingService;
use serde::Deserialize;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(book_post)
        .typed_delete(cancel_booking)
        .typed_post(mark_taken)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/bookings", rejection(ServerError))]
struct BookingsPath();

#[derive(Deserialize)]
struct BookPost {
    post_id: Id<PostMarker>,
}

async fn book_post(
    BookingsPath(): BookingsPath,
    State(bookings): State<BookingService>,
    user: AuthenticatedUser,
    Json(payload): Json<BookPost>,
) -> Result<()> {
    bookings.book(user.email(), payload.post_id).await?;

    Ok(())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/bookings/{post_id}", rejection(ServerError))]
struct BookingPath {
    post_id: Id<PostMarker>,
}

async fn cancel_booking(
    BookingPath { post_id }: BookingPath,
    State(bookings): State<BookingService>,
    user: AuthenticatedUser,
) -> Result<()> {
    bookings.cancel(user.email(), post_id).await?;

    Ok(())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/bookings/{post_id}/taken", rejection(ServerError))]
struct TakenPath {
    post_id: Id<PostMarker>,
}

async fn mark_taken(
    TakenPath { post_id }: TakenPath,
    State(bookings): State<BookingService>,
    user: AuthenticatedUser,
) -> Result<()> {
    bookings.mark_taken(user.email(), post_id).await?;

    Ok(())
}
