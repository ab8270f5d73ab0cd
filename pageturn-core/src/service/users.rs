use crate::{
    error::{Result, ServiceError},
    store::{AuthStore, PushTokenStore, ReviewStore, StoreError, UserStore},
};
use pageturn_common::{
    model::{
        auth::{AuthToken, Authentication},
        user::{CreateUser, Email, User, UserPatch, UserWithRating, Username},
    },
    util::{PositiveDuration, now_seconds},
};
use std::sync::Arc;
use time::Duration;

const TOKEN_TTL_DAYS: i64 = 90;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    reviews: Arc<dyn ReviewStore>,
    push_tokens: Arc<dyn PushTokenStore>,
    auth: Arc<dyn AuthStore>,
}

impl UserService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        reviews: Arc<dyn ReviewStore>,
        push_tokens: Arc<dyn PushTokenStore>,
        auth: Arc<dyn AuthStore>,
    ) -> Self {
        Self {
            users,
            reviews,
            push_tokens,
            auth,
        }
    }

    /// Registers a user and issues their bearer token. The token string is
    /// returned exactly once; only its hash is persisted.
    pub async fn create(&self, user: CreateUser) -> Result<(User, AuthToken)> {
        if self.exists(&user.email, Some(&user.username)).await? {
            return Err(ServiceError::UserAlreadyExists);
        }

        let now = now_seconds();
        let user = User {
            email: user.email,
            username: user.username,
            telegram_username: user.telegram_username,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await.map_err(|err| match err {
            StoreError::Conflict => ServiceError::UserAlreadyExists,
            other => ServiceError::Database(other),
        })?;

        let token = AuthToken::generate_random(user.email.clone());
        let token_hash = token
            .hash()
            .map_err(|err| ServiceError::Internal(Box::new(err)))?;
        self.auth
            .create(&Authentication {
                email: user.email.clone(),
                token_hash,
                created_at: now,
                expires_after: Some(PositiveDuration::new_unchecked(Duration::days(
                    TOKEN_TTL_DAYS,
                ))),
            })
            .await?;

        Ok((user, token))
    }

    pub async fn by_email(&self, email: &Email) -> Result<User> {
        self.users
            .by_email(email)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    pub async fn by_username(&self, username: &Username) -> Result<User> {
        self.users
            .by_username(username)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    pub async fn with_rating(&self, username: &Username) -> Result<UserWithRating> {
        let user = self.by_username(username).await?;
        let rating = self.reviews.average_rating(&user.email).await?;

        Ok(UserWithRating { user, rating })
    }

    pub async fn exists(&self, email: &Email, username: Option<&Username>) -> Result<bool> {
        if self.users.by_email(email).await?.is_some() {
            return Ok(true);
        }
        if let Some(username) = username
            && self.users.by_username(username).await?.is_some()
        {
            return Ok(true);
        }

        Ok(false)
    }

    pub async fn update(&self, email: &Email, patch: UserPatch) -> Result<User> {
        if let Some(username) = &patch.username
            && self.users.by_username(username).await?.is_some()
        {
            return Err(ServiceError::UserAlreadyExists);
        }
        self.by_email(email).await?;

        if !patch.is_empty() {
            self.users.update(email, &patch, now_seconds()).await?;
        }

        self.by_email(email).await
    }

    pub async fn bind_push_token(&self, email: &Email, token: &str) -> Result<()> {
        self.push_tokens
            .set(email, token)
            .await
            .map_err(|err| ServiceError::Internal(Box::new(err)))
    }
}
