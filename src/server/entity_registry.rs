//! Entity registry for managing resource descriptors and their CRUD routes

use crate::core::controller::ResourceController;
use crate::core::entity::Resource;
use crate::server::router::build_resource_routes;
use axum::Router;
use indexmap::IndexMap;
use std::sync::Arc;

/// Trait that describes how to build routes for an entity
///
/// [`ResourceDescriptor`] covers every [`ResourceController`]; custom
/// implementations can expose hand-written routers under the same registry.
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (singular, e.g., "order")
    fn entity_type(&self) -> &str;

    /// The plural form (e.g., "orders")
    fn plural(&self) -> &str;

    /// Build the routes for this entity, rooted at `/{plural}`
    fn build_routes(&self) -> Router;
}

/// Descriptor exposing a [`ResourceController`] over REST
pub struct ResourceDescriptor<T: Resource> {
    controller: Arc<ResourceController<T>>,
}

impl<T: Resource> ResourceDescriptor<T> {
    pub fn new(controller: Arc<ResourceController<T>>) -> Self {
        Self { controller }
    }
}

impl<T: Resource> EntityDescriptor for ResourceDescriptor<T> {
    fn entity_type(&self) -> &str {
        T::resource_name_singular()
    }

    fn plural(&self) -> &str {
        T::resource_name()
    }

    fn build_routes(&self) -> Router {
        build_resource_routes(self.controller.clone())
    }
}

/// Registry for all resources in the application
///
/// Descriptors are kept in registration order.
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: IndexMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            descriptors: IndexMap::new(),
        }
    }

    /// Register an entity descriptor
    ///
    /// The entity type name is the key; registering it again replaces the
    /// previous descriptor.
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        tracing::debug!(entity_type = %entity_type, plural = descriptor.plural(), "registering resource");
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Build a router with all registered entity routes
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes())
            })
    }

    /// Get all registered entity types
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Order {
        id: Uuid,
    }

    impl Resource for Order {
        fn resource_name() -> &'static str {
            "orders"
        }

        fn resource_name_singular() -> &'static str {
            "order"
        }

        fn id(&self) -> Uuid {
            self.id
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Invoice {
        id: Uuid,
    }

    impl Resource for Invoice {
        fn resource_name() -> &'static str {
            "invoices"
        }

        fn resource_name_singular() -> &'static str {
            "invoice"
        }

        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn descriptor<T: Resource + serde::de::DeserializeOwned>(items: Vec<T>) -> Box<ResourceDescriptor<T>> {
        let controller = ResourceController::builder(InMemoryStore::with_items(items)).build();
        Box::new(ResourceDescriptor::new(Arc::new(controller)))
    }

    async fn list(router: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_resource_descriptor_names() {
        let orders = descriptor::<Order>(vec![]);
        assert_eq!(orders.entity_type(), "order");
        assert_eq!(orders.plural(), "orders");
    }

    #[tokio::test]
    async fn test_merged_routes_serve_every_resource() {
        let mut registry = EntityRegistry::new();
        registry.register(descriptor(vec![Order { id: Uuid::new_v4() }]));
        registry.register(descriptor(vec![
            Invoice { id: Uuid::new_v4() },
            Invoice { id: Uuid::new_v4() },
        ]));
        let router = registry.build_routes();

        let (status, body) = list(router.clone(), "/orders").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 1);

        let (status, body) = list(router, "/invoices").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn test_registering_a_type_again_replaces_its_routes() {
        let mut registry = EntityRegistry::new();
        registry.register(descriptor(vec![Order { id: Uuid::new_v4() }]));
        registry.register(descriptor::<Order>(vec![]));
        assert_eq!(registry.entity_types(), vec!["order"]);

        let (status, body) = list(registry.build_routes(), "/orders").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_unregistered_prefix_is_not_routed() {
        let mut registry = EntityRegistry::default();
        registry.register(descriptor::<Order>(vec![]));

        let request = Request::builder().uri("/invoices").body(Body::empty()).unwrap();
        let response = registry.build_routes().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = EntityRegistry::new();
        registry.register(descriptor::<Invoice>(vec![]));
        registry.register(descriptor::<Order>(vec![]));
        assert_eq!(registry.entity_types(), vec!["invoice", "order"]);
    }
}
