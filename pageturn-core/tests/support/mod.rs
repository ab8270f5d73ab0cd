//! In-memory store implementations backing the service tests.

use async_trait::async_trait;
use pageturn_common::model::{
    Id,
    auth::{AuthTokenHash, Authentication},
    booking::{Booking, BookingMarker, NewBooking},
    place::{CreatePlace, Place, PlaceMarker},
    post::{CreatePost, Page, Post, PostFilter, PostMarker, PostPatch, PostStatus},
    review::{NewReview, Review},
    user::{CreateUser, Email, User, UserPatch, Username},
};
use pageturn_core::{
    gateway::{Notification, Notifier, NotifyError, TextGenError, TextGenerator},
    service::{BookingService, PlaceService, PostService, ReviewService, UserService},
    store::{
        AuthStore, BookingStore, PlaceStore, PostStore, PushTokenStore, Result, ReviewStore,
        StoreError, UserStore,
    },
};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};
use time::UtcDateTime;

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    places: HashMap<i64, Place>,
    posts: HashMap<i64, Post>,
    bookings: Vec<Booking>,
    favorites: HashSet<(i64, String)>,
    reviews: Vec<Review>,
    push_tokens: HashMap<String, String>,
    auths: Vec<Authentication>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn favored(&self, post: &Post, viewer: &Email) -> Post {
        let mut post = post.clone();
        post.is_favorite = self
            .favorites
            .contains(&(post.id.get(), viewer.get().to_owned()));
        post
    }
}

#[derive(Default)]
pub struct MemStore {
    state: Mutex<State>,
}

impl MemStore {
    pub fn post_status(&self, id: Id<PostMarker>) -> PostStatus {
        self.state.lock().unwrap().posts[&id.get()].status
    }

    pub fn booking_count(&self, id: Id<PostMarker>) -> usize {
        self.state
            .lock()
            .unwrap()
            .bookings
            .iter()
            .filter(|booking| booking.post_id == id)
            .count()
    }
}

fn paginate(mut posts: Vec<Post>, page: Page) -> Vec<Post> {
    posts.sort_by(|a, b| (b.created_at, b.id.get()).cmp(&(a.created_at, a.id.get())));
    posts
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl UserStore for MemStore {
    async fn by_email(&self, email: &Email) -> Result<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(email.get()).cloned())
    }

    async fn by_username(&self, username: &Username) -> Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|user| user.username == *username)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.users.contains_key(user.email.get()) {
            return Err(StoreError::Conflict);
        }
        state.users.insert(user.email.get().to_owned(), user.clone());
        Ok(())
    }

    async fn update(
        &self,
        email: &Email,
        patch: &UserPatch,
        updated_at: UtcDateTime,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.get_mut(email.get()) {
            if let Some(username) = &patch.username {
                user.username = username.clone();
            }
            if let Some(telegram_username) = &patch.telegram_username {
                user.telegram_username = Some(telegram_username.clone());
            }
            user.updated_at = updated_at;
        }
        Ok(())
    }
}

#[async_trait]
impl PlaceStore for MemStore {
    async fn all(&self) -> Result<Vec<Place>> {
        let mut places: Vec<_> = self.state.lock().unwrap().places.values().cloned().collect();
        places.sort_by_key(|place| place.id.get());
        Ok(places)
    }

    async fn by_id(&self, id: Id<PlaceMarker>) -> Result<Option<Place>> {
        Ok(self.state.lock().unwrap().places.get(&id.get()).cloned())
    }

    async fn create(&self, place: &CreatePlace) -> Result<Place> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let place = Place {
            id: id.into(),
            name: place.name.clone(),
            address: place.address.clone(),
        };
        state.places.insert(id, place.clone());
        Ok(place)
    }

    async fn delete(&self, id: Id<PlaceMarker>) -> Result<()> {
        self.state.lock().unwrap().places.remove(&id.get());
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemStore {
    async fn by_id(&self, id: Id<PostMarker>, viewer: &Email) -> Result<Option<Post>> {
        let state = self.state.lock().unwrap();
        Ok(state.posts.get(&id.get()).map(|post| state.favored(post, viewer)))
    }

    async fn create(
        &self,
        owner: &Email,
        post: &CreatePost,
        status: PostStatus,
        created_at: UtcDateTime,
    ) -> Result<Id<PostMarker>> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.posts.insert(
            id,
            Post {
                id: id.into(),
                owner: owner.clone(),
                place_id: post.place_id,
                title: post.title.clone(),
                description: post.description.clone(),
                genre: post.genre.clone(),
                author: post.author.clone(),
                publication_year: post.publication_year,
                publisher: post.publisher.clone(),
                condition: post.condition.clone(),
                cover: post.cover.clone(),
                pages_count: post.pages_count,
                images: post.images.clone(),
                summary: None,
                quote: None,
                status,
                created_at,
                is_favorite: false,
            },
        );
        Ok(id.into())
    }

    async fn patch(&self, id: Id<PostMarker>, patch: &PostPatch) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(post) = state.posts.get_mut(&id.get()) {
            if let Some(place_id) = patch.place_id {
                post.place_id = place_id;
            }
            if let Some(title) = &patch.title {
                post.title = title.clone();
            }
            if let Some(description) = &patch.description {
                post.description = description.clone();
            }
            if let Some(genre) = &patch.genre {
                post.genre = genre.clone();
            }
            if let Some(author) = &patch.author {
                post.author = author.clone();
            }
            if let Some(publication_year) = patch.publication_year {
                post.publication_year = publication_year;
            }
            if let Some(publisher) = &patch.publisher {
                post.publisher = publisher.clone();
            }
            if let Some(condition) = &patch.condition {
                post.condition = condition.clone();
            }
            if let Some(cover) = &patch.cover {
                post.cover = cover.clone();
            }
            if let Some(pages_count) = patch.pages_count {
                post.pages_count = pages_count;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Id<PostMarker>) -> Result<()> {
        self.state.lock().unwrap().posts.remove(&id.get());
        Ok(())
    }

    async fn list_available(
        &self,
        viewer: &Email,
        filter: &PostFilter,
        page: Page,
    ) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        let posts = state
            .posts
            .values()
            .filter(|post| post.status == PostStatus::Available && post.owner != *viewer)
            .filter(|post| filter.genre.as_ref().is_none_or(|genre| post.genre == *genre))
            .filter(|post| {
                filter
                    .condition
                    .as_ref()
                    .is_none_or(|condition| post.condition == *condition)
            })
            .filter(|post| {
                filter
                    .publication_year
                    .is_none_or(|year| post.publication_year == year)
            })
            .filter(|post| filter.place_id.is_none_or(|place| post.place_id == place))
            .map(|post| state.favored(post, viewer))
            .collect();
        Ok(paginate(posts, page))
    }

    async fn search(&self, term: &str, viewer: &Email, page: Page) -> Result<Vec<Post>> {
        let term = term.to_lowercase();
        let state = self.state.lock().unwrap();
        let posts = state
            .posts
            .values()
            .filter(|post| post.status == PostStatus::Available && post.owner != *viewer)
            .filter(|post| {
                post.title.to_lowercase().contains(&term)
                    || post.author.to_lowercase().contains(&term)
                    || post.genre.to_lowercase().contains(&term)
            })
            .map(|post| state.favored(post, viewer))
            .collect();
        Ok(paginate(posts, page))
    }

    async fn list_owned(
        &self,
        owner: &Email,
        status: Option<PostStatus>,
        page: Page,
    ) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        let posts = state
            .posts
            .values()
            .filter(|post| post.owner == *owner)
            .filter(|post| status.is_none_or(|status| post.status == status))
            .map(|post| state.favored(post, owner))
            .collect();
        Ok(paginate(posts, page))
    }

    async fn list_booked_by(&self, booker: &Email, page: Page) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        let posts = state
            .bookings
            .iter()
            .filter(|booking| booking.booker == *booker)
            .filter_map(|booking| state.posts.get(&booking.post_id.get()))
            .map(|post| state.favored(post, booker))
            .collect();
        Ok(paginate(posts, page))
    }

    async fn set_summary(&self, id: Id<PostMarker>, summary: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(post) = state.posts.get_mut(&id.get()) {
            post.summary = Some(summary.to_owned());
        }
        Ok(())
    }

    async fn set_quote(&self, id: Id<PostMarker>, quote: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(post) = state.posts.get_mut(&id.get()) {
            post.quote = Some(quote.to_owned());
        }
        Ok(())
    }

    async fn add_favorite(&self, id: Id<PostMarker>, user: &Email) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .favorites
            .insert((id.get(), user.get().to_owned()));
        Ok(())
    }

    async fn remove_favorite(&self, id: Id<PostMarker>, user: &Email) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .favorites
            .remove(&(id.get(), user.get().to_owned()));
        Ok(())
    }

    async fn list_favorites(&self, user: &Email, page: Page) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        let posts = state
            .posts
            .values()
            .filter(|post| {
                state
                    .favorites
                    .contains(&(post.id.get(), user.get().to_owned()))
            })
            .map(|post| state.favored(post, user))
            .collect();
        Ok(paginate(posts, page))
    }
}

#[async_trait]
impl BookingStore for MemStore {
    async fn by_post(&self, post_id: Id<PostMarker>) -> Result<Option<Booking>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .bookings
            .iter()
            .find(|booking| booking.post_id == post_id)
            .cloned())
    }

    // The check-and-insert below runs under one lock, mirroring the
    // single-transaction guarantee of the Postgres implementation.
    async fn book(&self, booking: &NewBooking) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state
            .bookings
            .iter()
            .any(|existing| existing.post_id == booking.post_id)
        {
            return Err(StoreError::Conflict);
        }

        let id = state.next_id();
        state.bookings.push(Booking {
            id: id.into(),
            booker: booking.booker.clone(),
            post_id: booking.post_id,
            created_at: booking.created_at,
        });
        if let Some(post) = state.posts.get_mut(&booking.post_id.get()) {
            post.status = PostStatus::Booked;
        }
        Ok(())
    }

    async fn cancel(&self, booking_id: Id<BookingMarker>, post_id: Id<PostMarker>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(post) = state.posts.get_mut(&post_id.get()) {
            post.status = PostStatus::Available;
        }
        state.bookings.retain(|booking| booking.id != booking_id);
        Ok(())
    }

    async fn take(&self, post_id: Id<PostMarker>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(post) = state.posts.get_mut(&post_id.get()) {
            post.status = PostStatus::Taken;
        }
        state.bookings.retain(|booking| booking.post_id != post_id);
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemStore {
    async fn create(&self, review: &NewReview) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.reviews.push(Review {
            id: id.into(),
            target: review.target.clone(),
            reviewer: review.reviewer.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: review.created_at,
        });
        Ok(())
    }

    async fn for_user(&self, target: &Email, page: Page) -> Result<Vec<Review>> {
        let reviews: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .reviews
            .iter()
            .filter(|review| review.target == *target)
            .cloned()
            .collect();
        Ok(reviews
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn average_rating(&self, target: &Email) -> Result<Option<f64>> {
        let state = self.state.lock().unwrap();
        let ratings: Vec<f64> = state
            .reviews
            .iter()
            .filter(|review| review.target == *target)
            .map(|review| f64::from(review.rating.get()))
            .collect();
        if ratings.is_empty() {
            return Ok(None);
        }
        #[allow(clippy::cast_precision_loss)]
        Ok(Some(ratings.iter().sum::<f64>() / ratings.len() as f64))
    }
}

#[async_trait]
impl PushTokenStore for MemStore {
    async fn set(&self, email: &Email, token: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .push_tokens
            .insert(email.get().to_owned(), token.to_owned());
        Ok(())
    }

    async fn by_email(&self, email: &Email) -> Result<Option<String>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .push_tokens
            .get(email.get())
            .cloned())
    }
}

#[async_trait]
impl AuthStore for MemStore {
    async fn create(&self, auth: &Authentication) -> Result<()> {
        self.state.lock().unwrap().auths.push(auth.clone());
        Ok(())
    }

    async fn by_token_hash(&self, hash: &AuthTokenHash) -> Result<Option<Authentication>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .auths
            .iter()
            .find(|auth| auth.token_hash == *hash)
            .cloned())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, Notification)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, token: &str, notification: &Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((token.to_owned(), notification.clone()));
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _token: &str, _notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError("gateway unreachable".into()))
    }
}

pub struct CannedGenerator;

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn brief_description(&self, title: &str, author: &str) -> Result<String, TextGenError> {
        Ok(format!("A short teaser for {title} by {author}."))
    }

    async fn quote(&self, title: &str, _author: &str) -> Result<String, TextGenError> {
        Ok(format!("A line from {title}."))
    }
}

pub struct TestApp {
    pub store: Arc<MemStore>,
    pub users: UserService,
    pub places: PlaceService,
    pub posts: PostService,
    pub bookings: BookingService,
    pub reviews: ReviewService,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::configure(false, None)
    }

    pub fn strict() -> Self {
        Self::configure(true, None)
    }

    pub fn with_failing_notifier() -> Self {
        Self::configure(false, Some(Arc::new(FailingNotifier)))
    }

    fn configure(strict_cancel_auth: bool, notifier: Option<Arc<dyn Notifier>>) -> Self {
        let store = Arc::new(MemStore::default());
        let recording = Arc::new(RecordingNotifier::default());
        let notifier: Arc<dyn Notifier> = match notifier {
            Some(notifier) => notifier,
            None => recording.clone(),
        };

        let users = UserService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        );
        let places = PlaceService::new(store.clone());
        let posts = PostService::new(
            store.clone(),
            users.clone(),
            places.clone(),
            Some(Arc::new(CannedGenerator)),
        );
        let bookings = BookingService::new(
            store.clone(),
            users.clone(),
            posts.clone(),
            store.clone(),
            Some(notifier),
            strict_cancel_auth,
        );
        let reviews = ReviewService::new(store.clone(), users.clone());

        Self {
            store,
            users,
            places,
            posts,
            bookings,
            reviews,
            notifier: recording,
        }
    }

    pub async fn seed_user(&self, email: &str, username: &str) -> Email {
        let (user, _token) = self
            .users
            .create(CreateUser {
                email: email_of(email),
                username: username_of(username),
                telegram_username: None,
            })
            .await
            .expect("seeding user failed");
        user.email
    }

    pub async fn seed_post(&self, owner: &Email, title: &str) -> Id<PostMarker> {
        let place = self
            .places
            .create(CreatePlace {
                name: "Central library".to_owned(),
                address: "1 Main street".to_owned(),
            })
            .await
            .expect("seeding place failed");

        let post = self
            .posts
            .create(
                owner,
                CreatePost {
                    place_id: place.id,
                    title: title.to_owned(),
                    description: "A well-loved copy".to_owned(),
                    genre: "Science fiction".to_owned(),
                    author: "Frank Herbert".to_owned(),
                    publication_year: 1965,
                    publisher: "Chilton Books".to_owned(),
                    condition: "good".to_owned(),
                    cover: String::new(),
                    pages_count: 412,
                    images: Vec::new(),
                },
            )
            .await
            .expect("seeding post failed");
        post.id
    }

    pub async fn bookings_by_post(&self, id: Id<PostMarker>) -> Option<Booking> {
        let store: &dyn BookingStore = &*self.store;
        store.by_post(id).await.unwrap()
    }

    pub async fn wait_for_notifications(&self, count: usize) {
        for _ in 0..100 {
            if self.notifier.sent.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("expected {count} notifications");
    }
}

pub fn email_of(email: &str) -> Email {
    Email::new(email.to_owned()).expect("invalid test email")
}

pub fn username_of(username: &str) -> Username {
    Username::new(username.to_owned()).expect("invalid test username")
}
