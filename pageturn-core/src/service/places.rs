use crate::{
    error::{Result, ServiceError},
    store::PlaceStore,
};
use pageturn_common::model::{
    Id,
    place::{CreatePlace, Place, PlaceMarker},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct PlaceService {
    places: Arc<dyn PlaceStore>,
}

impl PlaceService {
    #[must_use]
    pub fn new(places: Arc<dyn PlaceStore>) -> Self {
        Self { places }
    }

    pub async fn all(&self) -> Result<Vec<Place>> {
        Ok(self.places.all().await?)
    }

    pub async fn exists(&self, id: Id<PlaceMarker>) -> Result<bool> {
        Ok(self.places.by_id(id).await?.is_some())
    }

    pub async fn create(&self, place: CreatePlace) -> Result<Place> {
        Ok(self.places.create(&place).await?)
    }

    pub async fn delete(&self, id: Id<PlaceMarker>) -> Result<()> {
        if self.places.by_id(id).await?.is_none() {
            return Err(ServiceError::PlaceNotFound);
        }

        Ok(self.places.delete(id).await?)
    }
}
