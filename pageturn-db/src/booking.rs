use crate::{data_err, record::{BookingRecord, to_primitive}, store_err};
use async_trait::async_trait;
use pageturn_common::model::{
    Id,
    booking::{Booking, BookingMarker, NewBooking},
    post::PostMarker,
};
use pageturn_core::store::{BookingStore, Result};
use sqlx::PgPool;

/// Booking rows plus the post-status transitions. Every transition runs in
/// one transaction so a booking row and the post status can never disagree
/// after a partial failure. The unique key on `bookings.post_id` is what
/// actually serializes concurrent booking attempts.
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn by_post(&self, post_id: Id<PostMarker>) -> Result<Option<Booking>> {
        let record = sqlx::query_as::<_, BookingRecord>(
            "
            SELECT id, booker_email, post_id, created_at
            FROM bookings
            WHERE post_id = $1
            ",
        )
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        record.map(Booking::try_from).transpose().map_err(data_err)
    }

    async fn book(&self, booking: &NewBooking) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        sqlx::query(
            "
            INSERT INTO bookings (booker_email, post_id, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(booking.booker.get())
        .bind(booking.post_id.get())
        .bind(to_primitive(booking.created_at))
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        sqlx::query("UPDATE posts SET status = 'booked' WHERE id = $1")
            .bind(booking.post_id.get())
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        Ok(())
    }

    async fn cancel(&self, booking_id: Id<BookingMarker>, post_id: Id<PostMarker>) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        sqlx::query("UPDATE posts SET status = 'available' WHERE id = $1")
            .bind(post_id.get())
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id.get())
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        Ok(())
    }

    async fn take(&self, post_id: Id<PostMarker>) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        sqlx::query("UPDATE posts SET status = 'taken' WHERE id = $1")
            .bind(post_id.get())
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        sqlx::query("DELETE FROM bookings WHERE post_id = $1")
            .bind(post_id.get())
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        Ok(())
    }
}
