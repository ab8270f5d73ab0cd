use crate::{data_err, record::{ReviewRecord, to_primitive}, store_err};
use async_trait::async_trait;
use pageturn_common::model::{
    post::Page,
    review::{NewReview, Review},
    user::Email,
};
use pageturn_core::store::{Result, ReviewStore};
use sqlx::PgPool;

pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn create(&self, review: &NewReview) -> Result<()> {
        sqlx::query(
            "
            INSERT INTO reviews (target_email, reviewer_email, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(review.target.get())
        .bind(review.reviewer.get())
        .bind(review.rating.get())
        .bind(review.comment.get())
        .bind(to_primitive(review.created_at))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn for_user(&self, target: &Email, page: Page) -> Result<Vec<Review>> {
        let records = sqlx::query_as::<_, ReviewRecord>(
            "
            SELECT id, target_email, reviewer_email, rating, comment, created_at
            FROM reviews
            WHERE target_email = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(target.get())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        records
            .into_iter()
            .map(Review::try_from)
            .collect::<std::result::Result<_, _>>()
            .map_err(data_err)
    }

    async fn average_rating(&self, target: &Email) -> Result<Option<f64>> {
        let average: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(rating)::float8 FROM reviews WHERE target_email = $1",
        )
        .bind(target.get())
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(average)
    }
}
