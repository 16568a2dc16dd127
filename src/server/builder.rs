//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::{EntityDescriptor, EntityRegistry, ResourceDescriptor};
use super::exposure::RestExposure;
use crate::core::controller::ResourceController;
use crate::core::entity::Resource;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for creating HTTP servers with auto-registered routes
///
/// # Example
///
/// ```ignore
/// let orders = ResourceController::builder(InMemoryStore::<Order>::new())
///     .config(&config.resource("orders")?)
///     .build();
///
/// ServerBuilder::new()
///     .register_resource(orders)
///     .serve(&config.server.address())
///     .await?;
/// ```
pub struct ServerBuilder {
    entity_registry: EntityRegistry,
    custom_routes: Vec<Router>,
    trace: bool,
    cors: Option<CorsLayer>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            entity_registry: EntityRegistry::new(),
            custom_routes: Vec::new(),
            trace: true,
            cors: None,
        }
    }

    /// Expose a controller under `/{plural}`
    pub fn register_resource<T: Resource>(self, controller: ResourceController<T>) -> Self {
        self.register_shared_resource(Arc::new(controller))
    }

    /// Expose a controller that is also used outside the router
    pub fn register_shared_resource<T: Resource>(
        self,
        controller: Arc<ResourceController<T>>,
    ) -> Self {
        self.register_descriptor(ResourceDescriptor::new(controller))
    }

    /// Register any entity descriptor
    pub fn register_descriptor(mut self, descriptor: impl EntityDescriptor + 'static) -> Self {
        self.entity_registry.register(Box::new(descriptor));
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints that don't fit the resource pattern, such as
    /// authentication or webhooks.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let auth_routes = Router::new()
    ///     .route("/login", post(login_handler))
    ///     .route("/logout", post(logout_handler));
    ///
    /// ServerBuilder::new()
    ///     .with_custom_routes(auth_routes)
    ///     .register_resource(orders)
    ///     .build();
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Disable the HTTP trace layer
    pub fn without_trace_layer(mut self) -> Self {
        self.trace = false;
        self
    }

    /// Answer cross-origin requests with `layer`
    ///
    /// ```ignore
    /// ServerBuilder::new().with_cors(CorsLayer::permissive())
    /// ```
    pub fn with_cors(mut self, layer: CorsLayer) -> Self {
        self.cors = Some(layer);
        self
    }

    /// Registered entity types, in registration order
    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }

    /// Build the final REST router
    ///
    /// This generates:
    /// - Health routes (`/health`, `/healthz`)
    /// - CRUD routes for all registered resources
    /// - Custom routes
    pub fn build(self) -> Router {
        let mut app = RestExposure::build_router(&self.entity_registry, self.custom_routes);

        if let Some(cors) = self.cors {
            app = app.layer(cors);
        }
        if self.trace {
            app = app.layer(TraceLayer::new_for_http());
        }
        app
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let resources = self.entity_types().join(", ");
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(resources = %resources, "Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
