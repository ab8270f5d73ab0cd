use crate::server::{Result, ServerError, ServerRouter, auth::AuthenticatedUser, json::Json};
use axum::extract::{Query, State};
use axum_extra::routing::{RouterExt, TypedPath};
use pageturn_common::model::{
    Id,
    place::PlaceMarker,
    post::{CreatePost, Page, Post, PostFilter, PostMarker, PostPatch, PostStatus},
};
use pageturn_core::service::PostService;
use serde::Deserialize;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(create_post)
        .typed_get(browse_posts)
        .typed_get(get_post)
        .typed_patch(update_post)
        .typed_delete(delete_post)
        .typed_get(search_posts)
        .typed_get(my_posts)
        .typed_get(booked_posts)
        .typed_get(favorite_posts)
        .typed_put(add_favorite)
        .typed_delete(remove_favorite)
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Deserialize)]
struct PageQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

impl PageQuery {
    fn page(self) -> Page {
        let default = Page::default();
        Page {
            limit: self.limit.unwrap_or(default.limit),
            offset: self.offset.unwrap_or(default.offset),
        }
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct PostsPath();

async fn create_post(
    PostsPath(): PostsPath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePost>,
) -> Result<Json<Post>> {
    let post = posts.create(user.email(), payload).await?;

    // Summary and quote generation runs detached; the response does not
    // wait for the assistant.
    let service = posts.clone();
    let (id, title, author) = (post.id, post.title.clone(), post.author.clone());
    tokio::spawn(async move { service.enrich(id, &title, &author).await });

    Ok(Json(post))
}

#[derive(Deserialize)]
struct BrowseQuery {
    genre: Option<String>,
    condition: Option<String>,
    publication_year: Option<i32>,
    place_id: Option<Id<PlaceMarker>>,
    limit: Option<u32>,
    offset: Option<u32>,
}

async fn browse_posts(
    PostsPath(): PostsPath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<Vec<Post>>> {
    let filter = PostFilter {
        genre: query.genre,
        condition: query.condition,
        publication_year: query.publication_year,
        place_id: query.place_id,
    };
    let page = PageQuery {
        limit: query.limit,
        offset: query.offset,
    }
    .page();

    let found = posts.browse(user.email(), &filter, page).await?;

    Ok(Json(found))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    PostPath { id }: PostPath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
) -> Result<Json<Post>> {
    let post = posts.get(id, user.email()).await?;

    Ok(Json(post))
}

async fn update_post(
    PostPath { id }: PostPath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
    Json(patch): Json<PostPatch>,
) -> Result<Json<Post>> {
    let post = posts.update(user.email(), id, patch).await?;

    Ok(Json(post))
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
) -> Result<()> {
    posts.delete(user.email(), id).await?;

    Ok(())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/search", rejection(ServerError))]
struct SearchPath();

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    limit: Option<u32>,
    offset: Option<u32>,
}

async fn search_posts(
    SearchPath(): SearchPath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Post>>> {
    let page = PageQuery {
        limit: query.limit,
        offset: query.offset,
    }
    .page();

    let found = posts.search(&query.q, user.email(), page).await?;

    Ok(Json(found))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/mine", rejection(ServerError))]
struct MyPostsPath();

#[derive(Deserialize)]
struct MyPostsQuery {
    status: Option<PostStatus>,
    limit: Option<u32>,
    offset: Option<u32>,
}

async fn my_posts(
    MyPostsPath(): MyPostsPath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
    Query(query): Query<MyPostsQuery>,
) -> Result<Json<Vec<Post>>> {
    let page = PageQuery {
        limit: query.limit,
        offset: query.offset,
    }
    .page();

    let found = posts.owned_by(user.email(), query.status, page).await?;

    Ok(Json(found))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/booked", rejection(ServerError))]
struct BookedPostsPath();

async fn booked_posts(
    BookedPostsPath(): BookedPostsPath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<Post>>> {
    let found = posts.booked_by(user.email(), page.page()).await?;

    Ok(Json(found))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/favorites", rejection(ServerError))]
struct FavoritePostsPath();

async fn favorite_posts(
    FavoritePostsPath(): FavoritePostsPath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<Post>>> {
    let found = posts.favorites(user.email(), page.page()).await?;

    Ok(Json(found))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/favorite", rejection(ServerError))]
struct FavoritePath {
    id: Id<PostMarker>,
}

async fn add_favorite(
    FavoritePath { id }: FavoritePath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
) -> Result<()> {
    posts.add_favorite(user.email(), id).await?;

    Ok(())
}

async fn remove_favorite(
    FavoritePath { id }: FavoritePath,
    State(posts): State<PostService>,
    user: AuthenticatedUser,
) -> Result<()> {
    posts.remove_favorite(user.email(), id).await?;

    Ok(())
}
