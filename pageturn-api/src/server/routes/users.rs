use crate::server::{Result, ServerError, ServerRouter, auth::AuthenticatedUser, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use pageturn_common::model::user::{CreateUser, User, UserPatch, UserWithRating, Username};
use pageturn_core::service::UserService;
use serde::{Deserialize, Serialize};

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(create_user)
        .typed_get(get_user)
        .typed_put(update_me)
        .typed_post(bind_push_token)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users", rejection(ServerError))]
struct UsersPath();

#[derive(Serialize)]
struct RegisteredUser {
    user: User,
    /// Returned exactly once; only its hash is stored.
    token: String,
}

async fn create_user(
    UsersPath(): UsersPath,
    State(users): State<UserService>,
    Json(payload): Json<CreateUser>,
) -> Result<Json<RegisteredUser>> {
    let (user, token) = users.create(payload).await?;

    Ok(Json(RegisteredUser {
        user,
        token: token.as_token_str(),
    }))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{username}", rejection(ServerError))]
struct GetUserPath {
    username: Username,
}

async fn get_user(
    GetUserPath { username }: GetUserPath,
    State(users): State<UserService>,
) -> Result<Json<UserWithRating>> {
    let user = users.with_rating(&username).await?;

    Ok(Json(user))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/me", rejection(ServerError))]
struct MePath();

async fn update_me(
    MePath(): MePath,
    State(users): State<UserService>,
    user: AuthenticatedUser,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>> {
    let updated = users.update(user.email(), patch).await?;

    Ok(Json(updated))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/me/push-token", rejection(ServerError))]
struct PushTokenPath();

#[derive(Deserialize)]
struct BindPushToken {
    token: String,
}

async fn bind_push_token(
    PushTokenPath(): PushTokenPath,
    State(users): State<UserService>,
    user: AuthenticatedUser,
    Json(payload): Json<BindPushToken>,
) -> Result<()> {
    users.bind_push_token(user.email(), &payload.token).await?;

    Ok(())
}
