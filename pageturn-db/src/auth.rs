use crate::{data_err, record::{AuthenticationRecord, to_primitive}, store_err};
use async_trait::async_trait;
use pageturn_common::model::auth::{AuthTokenHash, Authentication};
use pageturn_core::store::{AuthStore, Result};
use sqlx::PgPool;

pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn create(&self, auth: &Authentication) -> Result<()> {
        sqlx::query(
            "
            INSERT INTO authentications (token_hash, user_email, created_at, expires_after_seconds)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&auth.token_hash.0[..])
        .bind(auth.email.get())
        .bind(to_primitive(auth.created_at))
        .bind(auth.expires_after.map(|ttl| ttl.get().whole_seconds()))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn by_token_hash(&self, hash: &AuthTokenHash) -> Result<Option<Authentication>> {
        let record = sqlx::query_as::<_, AuthenticationRecord>(
            "
            SELECT user_email, token_hash, created_at, expires_after_seconds
            FROM authentications
            WHERE token_hash = $1
            ",
        )
        .bind(&hash.0[..])
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        record
            .map(Authentication::try_from)
            .transpose()
            .map_err(data_err)
    }
}
