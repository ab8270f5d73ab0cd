use crate::{
    error::{Result, ServiceError},
    gateway::TextGenerator,
    service::{PlaceService, UserService},
    store::PostStore,
};
use pageturn_common::{
    model::{
        Id,
        post::{CreatePost, Page, Post, PostFilter, PostMarker, PostPatch, PostStatus},
        user::Email,
    },
    util::now_seconds,
};
use std::sync::Arc;
use tracing::warn;

/// Owns post existence, ownership validation and listing queries. It never
/// writes `status`: the state machine lives behind
/// [`crate::store::BookingStore`] and is driven by
/// [`crate::service::BookingService`] alone.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
    users: UserService,
    places: PlaceService,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl PostService {
    #[must_use]
    pub fn new(
        posts: Arc<dyn PostStore>,
        users: UserService,
        places: PlaceService,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            posts,
            users,
            places,
            generator,
        }
    }

    pub async fn create(&self, owner: &Email, details: CreatePost) -> Result<Post> {
        if !self.users.exists(owner, None).await? {
            return Err(ServiceError::UserNotFound);
        }
        if !self.places.exists(details.place_id).await? {
            return Err(ServiceError::PlaceNotFound);
        }

        let id = self
            .posts
            .create(owner, &details, PostStatus::Available, now_seconds())
            .await?;

        self.get(id, owner).await
    }

    pub async fn get(&self, id: Id<PostMarker>, viewer: &Email) -> Result<Post> {
        self.posts
            .by_id(id, viewer)
            .await?
            .ok_or(ServiceError::PostNotFound)
    }

    /// Existence and ownership are two separate questions: an absent post is
    /// `PostNotFound`, somebody else's post is `UserIsNotOwner`.
    async fn get_owned(&self, id: Id<PostMarker>, owner: &Email) -> Result<Post> {
        let post = self.get(id, owner).await?;
        if post.owner != *owner {
            return Err(ServiceError::UserIsNotOwner);
        }

        Ok(post)
    }

    pub async fn update(&self, owner: &Email, id: Id<PostMarker>, patch: PostPatch) -> Result<Post> {
        self.get_owned(id, owner).await?;

        if !patch.is_empty() {
            self.posts.patch(id, &patch).await?;
        }

        self.get(id, owner).await
    }

    pub async fn delete(&self, owner: &Email, id: Id<PostMarker>) -> Result<()> {
        self.get_owned(id, owner).await?;

        Ok(self.posts.delete(id).await?)
    }

    pub async fn browse(
        &self,
        viewer: &Email,
        filter: &PostFilter,
        page: Page,
    ) -> Result<Vec<Post>> {
        Ok(self.posts.list_available(viewer, filter, page).await?)
    }

    pub async fn search(&self, query: &str, viewer: &Email, page: Page) -> Result<Vec<Post>> {
        Ok(self.posts.search(query, viewer, page).await?)
    }

    pub async fn owned_by(
        &self,
        owner: &Email,
        status: Option<PostStatus>,
        page: Page,
    ) -> Result<Vec<Post>> {
        if !self.users.exists(owner, None).await? {
            return Err(ServiceError::UserNotFound);
        }

        Ok(self.posts.list_owned(owner, status, page).await?)
    }

    pub async fn booked_by(&self, booker: &Email, page: Page) -> Result<Vec<Post>> {
        if !self.users.exists(booker, None).await? {
            return Err(ServiceError::UserNotFound);
        }

        Ok(self.posts.list_booked_by(booker, page).await?)
    }

    pub async fn add_favorite(&self, user: &Email, id: Id<PostMarker>) -> Result<()> {
        if !self.users.exists(user, None).await? {
            return Err(ServiceError::UserNotFound);
        }
        self.get(id, user).await?;

        Ok(self.posts.add_favorite(id, user).await?)
    }

    pub async fn remove_favorite(&self, user: &Email, id: Id<PostMarker>) -> Result<()> {
        if !self.users.exists(user, None).await? {
            return Err(ServiceError::UserNotFound);
        }
        self.get(id, user).await?;

        Ok(self.posts.remove_favorite(id, user).await?)
    }

    pub async fn favorites(&self, user: &Email, page: Page) -> Result<Vec<Post>> {
        if !self.users.exists(user, None).await? {
            return Err(ServiceError::UserNotFound);
        }

        Ok(self.posts.list_favorites(user, page).await?)
    }

    /// Generates and stores the summary and quote for a freshly created
    /// post. Best-effort: failures are logged and the fields stay empty.
    /// Callers run this detached from the request that created the post.
    pub async fn enrich(&self, id: Id<PostMarker>, title: &str, author: &str) {
        let Some(generator) = &self.generator else {
            return;
        };

        match generator.brief_description(title, author).await {
            Ok(summary) => {
                if let Err(err) = self.posts.set_summary(id, &summary).await {
                    warn!(post = %id, error = %err, "Storing generated summary failed");
                }
            }
            Err(err) => warn!(post = %id, error = %err, "Summary generation failed"),
        }

        match generator.quote(title, author).await {
            Ok(quote) => {
                if let Err(err) = self.posts.set_quote(id, &quote).await {
                    warn!(post = %id, error = %err, "Storing generated quote failed");
                }
            }
            Err(err) => warn!(post = %id, error = %err, "Quote generation failed"),
        }
    }
}
