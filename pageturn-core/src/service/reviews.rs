use crate::{
    error::{Result, ServiceError},
    service::UserService,
    store::ReviewStore,
};
use pageturn_common::{
    model::{
        post::Page,
        review::{CreateReview, NewReview, Review},
        user::{Email, Username},
    },
    util::now_seconds,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewStore>,
    users: UserService,
}

impl ReviewService {
    #[must_use]
    pub fn new(reviews: Arc<dyn ReviewStore>, users: UserService) -> Self {
        Self { reviews, users }
    }

    pub async fn create(&self, reviewer: &Email, review: CreateReview) -> Result<()> {
        if !self.users.exists(&review.target, None).await? {
            return Err(ServiceError::UserNotFound);
        }
        if !self.users.exists(reviewer, None).await? {
            return Err(ServiceError::UserNotFound);
        }
        if review.target == *reviewer {
            return Err(ServiceError::SelfReview);
        }

        Ok(self
            .reviews
            .create(&NewReview {
                target: review.target,
                reviewer: reviewer.clone(),
                rating: review.rating,
                comment: review.comment,
                created_at: now_seconds(),
            })
            .await?)
    }

    /// Reviews received by the named user, newest first.
    pub async fn for_user(&self, username: &Username, page: Page) -> Result<Vec<Review>> {
        let user = self.users.by_username(username).await?;

        Ok(self.reviews.for_user(&user.email, page).await?)
    }
}
