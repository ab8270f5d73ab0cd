//! Postgres implementations of the `pageturn-core` storage capabilities.

pub mod auth;
pub mod booking;
pub mod place;
pub mod post;
pub mod push_token;
mod record;
pub mod review;
pub mod user;

use pageturn_core::store::StoreError;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Unique-key violations become [`StoreError::Conflict`]; everything else
/// is an opaque backend failure.
pub(crate) fn store_err(err: sqlx::Error) -> StoreError {
    if err
        .as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
    {
        StoreError::Conflict
    } else {
        StoreError::backend(err)
    }
}

pub(crate) fn data_err(err: pageturn_common::model::ModelValidationError) -> StoreError {
    StoreError::backend(err)
}
