use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use pageturn_common::model::{auth::AuthToken, user::Email};
use pageturn_core::store::AuthStore;
use std::sync::Arc;
use time::UtcDateTime;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// Identity resolved from the bearer token: the token is parsed, its core
/// hashed and looked up, and the expiry checked.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AuthenticatedUser {
    email: Email,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<dyn AuthStore>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let request_token: AuthToken = AuthorizationHeader::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?
            .token()
            .parse()?;

        let token_hash = request_token.hash()?;

        let authentication = Arc::<dyn AuthStore>::from_ref(state)
            .by_token_hash(&token_hash)
            .await?
            .ok_or(ServerError::InvalidToken)?;

        // A token naming one user but hashing to another user's row is not
        // acceptable as a login.
        if authentication.email != request_token.email {
            return Err(ServerError::InvalidToken);
        }

        if let Some(expires_after) = authentication.expires_after
            && authentication.created_at + expires_after.get() < UtcDateTime::now()
        {
            return Err(ServerError::InvalidToken);
        }

        Ok(Self {
            email: authentication.email,
        })
    }
}
