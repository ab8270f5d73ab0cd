use crate::{
    error::{Result, ServiceError},
    gateway::{Notification, Notifier},
    service::{PostService, UserService},
    store::{BookingStore, PushTokenStore, StoreError},
};
use pageturn_common::{
    model::{
        Id,
        booking::NewBooking,
        post::{Post, PostMarker, PostStatus},
        user::Email,
    },
    util::now_seconds,
};
use std::sync::Arc;
use tracing::warn;

/// Orchestrates the post availability state machine:
///
/// ```text
///            book (non-owner)              cancel
/// available ────────────────► booked ──────────────► available
///                                │
///                                │ mark_taken (non-owner)
///                                ▼
///                              taken   (terminal)
/// ```
///
/// Each transition is persisted as one atomic unit by the booking store.
#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingStore>,
    users: UserService,
    posts: PostService,
    push_tokens: Arc<dyn PushTokenStore>,
    notifier: Option<Arc<dyn Notifier>>,
    strict_cancel_auth: bool,
}

impl BookingService {
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        users: UserService,
        posts: PostService,
        push_tokens: Arc<dyn PushTokenStore>,
        notifier: Option<Arc<dyn Notifier>>,
        strict_cancel_auth: bool,
    ) -> Self {
        Self {
            bookings,
            users,
            posts,
            push_tokens,
            notifier,
            strict_cancel_auth,
        }
    }

    /// Claims an available post for `requester` and moves it to `booked`.
    ///
    /// The owner can never book their own post, whatever its status. The
    /// pre-check against an existing booking is advisory; under a race the
    /// unique key on the bookings table decides, and the loser gets
    /// [`ServiceError::BookingAlreadyExists`].
    pub async fn book(&self, requester: &Email, post_id: Id<PostMarker>) -> Result<()> {
        self.users.by_email(requester).await?;
        let post = self.posts.get(post_id, requester).await?;

        if post.owner == *requester {
            return Err(ServiceError::UserIsOwner);
        }
        if post.status != PostStatus::Available {
            return Err(ServiceError::PostIsNotAvailable);
        }
        if self.bookings.by_post(post_id).await?.is_some() {
            return Err(ServiceError::BookingAlreadyExists);
        }

        let booking = NewBooking {
            booker: requester.clone(),
            post_id,
            created_at: now_seconds(),
        };
        match self.bookings.book(&booking).await {
            Ok(()) => {}
            Err(StoreError::Conflict) => return Err(ServiceError::BookingAlreadyExists),
            Err(other) => return Err(ServiceError::Database(other)),
        }

        self.notify_owner(post);

        Ok(())
    }

    /// Cancels the booking on a post, restoring it to `available`.
    ///
    /// With `strict_cancel_auth` unset any existing user may cancel; set,
    /// only the original booker may.
    pub async fn cancel(&self, requester: &Email, post_id: Id<PostMarker>) -> Result<()> {
        let booking = self
            .bookings
            .by_post(post_id)
            .await?
            .ok_or(ServiceError::BookingNotFound)?;
        self.users.by_email(requester).await?;
        self.posts.get(post_id, requester).await?;

        if self.strict_cancel_auth && booking.booker != *requester {
            return Err(ServiceError::UserIsNotBooker);
        }

        Ok(self.bookings.cancel(booking.id, post_id).await?)
    }

    /// Confirms the hand-over: the post becomes `taken` and every booking
    /// referencing it is purged. Only a non-owner may confirm. Terminal.
    pub async fn mark_taken(&self, requester: &Email, post_id: Id<PostMarker>) -> Result<()> {
        self.users.by_email(requester).await?;
        let post = self.posts.get(post_id, requester).await?;

        if post.owner == *requester {
            return Err(ServiceError::UserIsOwner);
        }

        Ok(self.bookings.take(post_id).await?)
    }

    /// Fire-and-forget push to the post owner. Runs detached so delivery
    /// latency or failure cannot affect the committed booking.
    fn notify_owner(&self, post: Post) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        let push_tokens = Arc::clone(&self.push_tokens);

        tokio::spawn(async move {
            let token = match push_tokens.by_email(&post.owner).await {
                Ok(Some(token)) => token,
                Ok(None) => return,
                Err(err) => {
                    warn!(owner = %post.owner.get(), error = %err, "Push token lookup failed");
                    return;
                }
            };

            let notification = Notification::booking_created(&post.title);
            if let Err(err) = notifier.send(&token, &notification).await {
                warn!(owner = %post.owner.get(), error = %err, "Push delivery failed");
            }
        });
    }
}
