use crate::{record::PlaceRecord, store_err};
use async_trait::async_trait;
use pageturn_common::model::{
    Id,
    place::{CreatePlace, Place, PlaceMarker},
};
use pageturn_core::store::{PlaceStore, Result};
use sqlx::PgPool;

pub struct PgPlaceStore {
    pool: PgPool,
}

impl PgPlaceStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaceStore for PgPlaceStore {
    async fn all(&self) -> Result<Vec<Place>> {
        let records = sqlx::query_as::<_, PlaceRecord>("SELECT id, name, address FROM places ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(records.into_iter().map(Place::from).collect())
    }

    async fn by_id(&self, id: Id<PlaceMarker>) -> Result<Option<Place>> {
        let record =
            sqlx::query_as::<_, PlaceRecord>("SELECT id, name, address FROM places WHERE id = $1")
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(store_err)?;

        Ok(record.map(Place::from))
    }

    async fn create(&self, place: &CreatePlace) -> Result<Place> {
        let record = sqlx::query_as::<_, PlaceRecord>(
            "
            INSERT INTO places (name, address)
            VALUES ($1, $2)
            RETURNING id, name, address
            ",
        )
        .bind(&place.name)
        .bind(&place.address)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(record.into())
    }

    async fn delete(&self, id: Id<PlaceMarker>) -> Result<()> {
        sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }
}
