use crate::{data_err, record::{PostRecord, to_primitive}, store_err};
use async_trait::async_trait;
use pageturn_common::model::{
    Id,
    post::{CreatePost, Page, Post, PostFilter, PostMarker, PostPatch, PostStatus},
    user::Email,
};
use pageturn_core::store::{PostStore, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::UtcDateTime;

const POST_COLUMNS: &str = "posts.id, posts.owner_email, posts.place_id, posts.title, \
     posts.description, posts.genre, posts.author, posts.publication_year, posts.publisher, \
     posts.condition, posts.cover, posts.pages_count, posts.images, posts.summary, posts.quote, \
     posts.status, posts.created_at";

pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Starts a post selection computing `is_favorite` for `viewer`. Callers
/// append `JOIN`/`WHERE` clauses and pagination.
fn select_posts(viewer: &Email) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {POST_COLUMNS}, EXISTS(\
            SELECT 1 FROM favorites \
            WHERE favorites.post_id = posts.id AND favorites.user_email = "
    ));
    query.push_bind(viewer.get());
    query.push(") AS is_favorite FROM posts");

    query
}

fn push_page(query: &mut QueryBuilder<'_, Postgres>, page: Page) {
    query.push(" ORDER BY posts.created_at DESC LIMIT ");
    query.push_bind(i64::from(page.limit));
    query.push(" OFFSET ");
    query.push_bind(i64::from(page.offset));
}

fn into_posts(records: Vec<PostRecord>) -> Result<Vec<Post>> {
    records
        .into_iter()
        .map(Post::try_from)
        .collect::<std::result::Result<_, _>>()
        .map_err(data_err)
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn by_id(&self, id: Id<PostMarker>, viewer: &Email) -> Result<Option<Post>> {
        let mut query = select_posts(viewer);
        query.push(" WHERE posts.id = ");
        query.push_bind(id.get());

        let record = query
            .build_query_as::<PostRecord>()
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        record.map(Post::try_from).transpose().map_err(data_err)
    }

    async fn create(
        &self,
        owner: &Email,
        post: &CreatePost,
        status: PostStatus,
        created_at: UtcDateTime,
    ) -> Result<Id<PostMarker>> {
        let id: i64 = sqlx::query_scalar(
            "
            INSERT INTO posts (owner_email, place_id, title, description, genre, author,
                publication_year, publisher, condition, cover, pages_count, images, status,
                created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            ",
        )
        .bind(owner.get())
        .bind(post.place_id.get())
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.genre)
        .bind(&post.author)
        .bind(post.publication_year)
        .bind(&post.publisher)
        .bind(&post.condition)
        .bind(&post.cover)
        .bind(post.pages_count)
        .bind(&post.images)
        .bind(status.as_str())
        .bind(to_primitive(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(id.into())
    }

    async fn patch(&self, id: Id<PostMarker>, patch: &PostPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::new("UPDATE posts SET ");
        {
            let mut fields = query.separated(", ");
            if let Some(place_id) = patch.place_id {
                fields.push("place_id = ");
                fields.push_bind_unseparated(place_id.get());
            }
            if let Some(title) = &patch.title {
                fields.push("title = ");
                fields.push_bind_unseparated(title);
            }
            if let Some(description) = &patch.description {
                fields.push("description = ");
                fields.push_bind_unseparated(description);
            }
            if let Some(genre) = &patch.genre {
                fields.push("genre = ");
                fields.push_bind_unseparated(genre);
            }
            if let Some(author) = &patch.author {
                fields.push("author = ");
                fields.push_bind_unseparated(author);
            }
            if let Some(publication_year) = patch.publication_year {
                fields.push("publication_year = ");
                fields.push_bind_unseparated(publication_year);
            }
            if let Some(publisher) = &patch.publisher {
                fields.push("publisher = ");
                fields.push_bind_unseparated(publisher);
            }
            if let Some(condition) = &patch.condition {
                fields.push("condition = ");
                fields.push_bind_unseparated(condition);
            }
            if let Some(cover) = &patch.cover {
                fields.push("cover = ");
                fields.push_bind_unseparated(cover);
            }
            if let Some(pages_count) = patch.pages_count {
                fields.push("pages_count = ");
                fields.push_bind_unseparated(pages_count);
            }
        }
        query.push(" WHERE id = ");
        query.push_bind(id.get());

        query
            .build()
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn delete(&self, id: Id<PostMarker>) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn list_available(
        &self,
        viewer: &Email,
        filter: &PostFilter,
        page: Page,
    ) -> Result<Vec<Post>> {
        let mut query = select_posts(viewer);
        query.push(" WHERE posts.status = 'available' AND posts.owner_email <> ");
        query.push_bind(viewer.get());
        if let Some(genre) = &filter.genre {
            query.push(" AND posts.genre = ");
            query.push_bind(genre);
        }
        if let Some(condition) = &filter.condition {
            query.push(" AND posts.condition = ");
            query.push_bind(condition);
        }
        if let Some(publication_year) = filter.publication_year {
            query.push(" AND posts.publication_year = ");
            query.push_bind(publication_year);
        }
        if let Some(place_id) = filter.place_id {
            query.push(" AND posts.place_id = ");
            query.push_bind(place_id.get());
        }
        push_page(&mut query, page);

        let records = query
            .build_query_as::<PostRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        into_posts(records)
    }

    async fn search(&self, term: &str, viewer: &Email, page: Page) -> Result<Vec<Post>> {
        let pattern = format!("%{term}%");

        let mut query = select_posts(viewer);
        query.push(" WHERE posts.status = 'available' AND posts.owner_email <> ");
        query.push_bind(viewer.get());
        query.push(" AND (posts.title ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR posts.author ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR posts.genre ILIKE ");
        query.push_bind(pattern);
        query.push(")");
        push_page(&mut query, page);

        let records = query
            .build_query_as::<PostRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        into_posts(records)
    }

    async fn list_owned(
        &self,
        owner: &Email,
        status: Option<PostStatus>,
        page: Page,
    ) -> Result<Vec<Post>> {
        let mut query = select_posts(owner);
        query.push(" WHERE posts.owner_email = ");
        query.push_bind(owner.get());
        if let Some(status) = status {
            query.push(" AND posts.status = ");
            query.push_bind(status.as_str());
        }
        push_page(&mut query, page);

        let records = query
            .build_query_as::<PostRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        into_posts(records)
    }

    async fn list_booked_by(&self, booker: &Email, page: Page) -> Result<Vec<Post>> {
        let mut query = select_posts(booker);
        query.push(" JOIN bookings ON bookings.post_id = posts.id WHERE bookings.booker_email = ");
        query.push_bind(booker.get());
        push_page(&mut query, page);

        let records = query
            .build_query_as::<PostRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        into_posts(records)
    }

    async fn set_summary(&self, id: Id<PostMarker>, summary: &str) -> Result<()> {
        sqlx::query("UPDATE posts SET summary = $2 WHERE id = $1")
            .bind(id.get())
            .bind(summary)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn set_quote(&self, id: Id<PostMarker>, quote: &str) -> Result<()> {
        sqlx::query("UPDATE posts SET quote = $2 WHERE id = $1")
            .bind(id.get())
            .bind(quote)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn add_favorite(&self, id: Id<PostMarker>, user: &Email) -> Result<()> {
        sqlx::query(
            "
            INSERT INTO favorites (post_id, user_email)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(id.get())
        .bind(user.get())
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn remove_favorite(&self, id: Id<PostMarker>, user: &Email) -> Result<()> {
        sqlx::query("DELETE FROM favorites WHERE post_id = $1 AND user_email = $2")
            .bind(id.get())
            .bind(user.get())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn list_favorites(&self, user: &Email, page: Page) -> Result<Vec<Post>> {
        let mut query = select_posts(user);
        query.push(" JOIN favorites ON favorites.post_id = posts.id WHERE favorites.user_email = ");
        query.push_bind(user.get());
        push_page(&mut query, page);

        let records = query
            .build_query_as::<PostRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        into_posts(records)
    }
}
