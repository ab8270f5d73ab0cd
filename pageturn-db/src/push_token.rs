use crate::store_err;
use async_trait::async_trait;
use pageturn_common::model::user::Email;
use pageturn_core::store::{PushTokenStore, Result};
use sqlx::PgPool;

pub struct PgPushTokenStore {
    pool: PgPool,
}

impl PgPushTokenStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PushTokenStore for PgPushTokenStore {
    async fn set(&self, email: &Email, token: &str) -> Result<()> {
        sqlx::query(
            "
            INSERT INTO push_tokens (user_email, token)
            VALUES ($1, $2)
            ON CONFLICT (user_email) DO UPDATE SET token = EXCLUDED.token
            ",
        )
        .bind(email.get())
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn by_email(&self, email: &Email) -> Result<Option<String>> {
        let token: Option<String> =
            sqlx::query_scalar("SELECT token FROM push_tokens WHERE user_email = $1")
                .bind(email.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(store_err)?;

        Ok(token)
    }
}
