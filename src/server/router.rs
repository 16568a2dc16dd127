//! Router builder utilities for resource routes

use crate::core::controller::ResourceController;
use crate::core::entity::Resource;
use crate::server::exposure::rest::handlers::{create, delete, exists, list, show, update};
use axum::{Router, routing::get};
use std::sync::Arc;

/// Build the CRUD routes of one resource
///
/// - GET /{plural} - Filtered, paginated list
/// - POST /{plural} - Create
/// - GET /{plural}/{id} - Show
/// - PUT|PATCH /{plural}/{id} - Update
/// - DELETE /{plural}/{id} - Delete
/// - GET /{plural}/{id}/exists - Existence check
pub fn build_resource_routes<T: Resource>(controller: Arc<ResourceController<T>>) -> Router {
    let plural = T::resource_name();

    Router::new()
        .route(&format!("/{plural}"), get(list::<T>).post(create::<T>))
        .route(
            &format!("/{plural}/{{id}}"),
            get(show::<T>)
                .put(update::<T>)
                .patch(update::<T>)
                .delete(delete::<T>),
        )
        .route(&format!("/{plural}/{{id}}/exists"), get(exists::<T>))
        .with_state(controller)
}
