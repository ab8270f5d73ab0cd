use crate::server::{Result, ServerError, ServerRouter, auth::AuthenticatedUser, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use pageturn_common::model::{
    Id,
    place::{CreatePlace, Place, PlaceMarker},
};
use pageturn_core::service::PlaceService;
use serde::Deserialize;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_places)
        .typed_post(create_place)
        .typed_delete(delete_place)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/places", rejection(ServerError))]
struct PlacesPath();

async fn get_places(
    PlacesPath(): PlacesPath,
    State(places): State<PlaceService>,
) -> Result<Json<Vec<Place>>> {
    let all = places.all().await?;

    Ok(Json(all))
}

async fn create_place(
    PlacesPath(): PlacesPath,
    State(places): State<PlaceService>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreatePlace>,
) -> Result<Json<Place>> {
    let place = places.create(payload).await?;

    Ok(Json(place))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/places/{id}", rejection(ServerError))]
struct PlacePath {
    id: Id<PlaceMarker>,
}

async fn delete_place(
    PlacePath { id }: PlacePath,
    State(places): State<PlaceService>,
    _user: AuthenticatedUser,
) -> Result<()> {
    places.delete(id).await?;

    Ok(())
}
