use crate::server::{Result, ServerError, ServerRouter, auth::AuthenticatedUser, json::Json};
use axum::extract::{Query, State};
use axum_extra::routing::{RouterExt, TypedPath};
use pageturn_common::model::{
    post::Page,
    review::{CreateReview, Review},
    user::Username,
};
use pageturn_core::service::ReviewService;
use serde::Deserialize;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(create_review)
        .typed_get(get_reviews)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/reviews", rejection(ServerError))]
struct ReviewsPath();

async fn create_review(
    ReviewsPath(): ReviewsPath,
    State(reviews): State<ReviewService>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateReview>,
) -> Result<()> {
    reviews.create(user.email(), payload).await?;

    Ok(())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/reviews/{username}", rejection(ServerError))]
struct UserReviewsPath {
    username: Username,
}

#[derive(Deserialize)]
struct ReviewsQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

async fn get_reviews(
    UserReviewsPath { username }: UserReviewsPath,
    State(reviews): State<ReviewService>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<Vec<Review>>> {
    let page = Page {
        limit: query.limit.unwrap_or_else(|| Page::default().limit),
        offset: query.offset.unwrap_or(0),
    };

    let found = reviews.for_user(&username, page).await?;

    Ok(Json(found))
}
