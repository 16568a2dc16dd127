//! REST API exposure for registered resources
//!
//! This module provides REST-specific routing and handlers. It consumes an
//! [`EntityRegistry`] and produces an Axum `Router`.

pub mod handlers;

use crate::server::entity_registry::EntityRegistry;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a registry
    ///
    /// The router holds the health check routes, every resource's CRUD
    /// routes and the custom routes, merged in that order.
    pub fn build_router(registry: &EntityRegistry, custom_routes: Vec<Router>) -> Router {
        let mut app = Self::health_routes().merge(registry.build_routes());

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME")
        }))
    }
}
