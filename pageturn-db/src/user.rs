use crate::{data_err, record::{UserRecord, to_primitive}, store_err};
use async_trait::async_trait;
use pageturn_common::model::user::{Email, User, UserPatch, Username};
use pageturn_core::store::{Result, UserStore};
use sqlx::{PgPool, QueryBuilder};
use time::UtcDateTime;

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn by_email(&self, email: &Email) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "
            SELECT email, username, telegram_username, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        record.map(User::try_from).transpose().map_err(data_err)
    }

    async fn by_username(&self, username: &Username) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "
            SELECT email, username, telegram_username, created_at, updated_at
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        record.map(User::try_from).transpose().map_err(data_err)
    }

    async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            "
            INSERT INTO users (email, username, telegram_username, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(user.email.get())
        .bind(user.username.get())
        .bind(user.telegram_username.as_deref())
        .bind(to_primitive(user.created_at))
        .bind(to_primitive(user.updated_at))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn update(
        &self,
        email: &Email,
        patch: &UserPatch,
        updated_at: UtcDateTime,
    ) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::new("UPDATE users SET updated_at = ");
        query.push_bind(to_primitive(updated_at));
        if let Some(username) = &patch.username {
            query.push(", username = ");
            query.push_bind(username.get());
        }
        if let Some(telegram_username) = &patch.telegram_username {
            query.push(", telegram_username = ");
            query.push_bind(telegram_username);
        }
        query.push(" WHERE email = ");
        query.push_bind(email.get());

        query
            .build()
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }
}
