//! Orders API served from a YAML configuration
//!
//! ```sh
//! cargo run --example orders_api
//! curl -X POST localhost:3000/orders -H 'content-type: application/json' \
//!      -d '{"customer":"Ada","email":"ada@example.com","total":42}'
//! curl 'localhost:3000/orders?min_total=10&status[]=pending&status[]=paid'
//! ```

use resource_controller::prelude::*;

const CONFIG: &str = include_str!("config.yaml");

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Order {
    id: Uuid,
    customer: String,
    email: String,
    total: f64,
    #[serde(default = "default_status")]
    status: String,
    /// Orders flagged for fraud review are hidden from `GET /orders/{id}`
    #[serde(default)]
    under_review: bool,
}

fn default_status() -> String {
    "pending".to_string()
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

    fn is_exception(&self) -> bool {
        self.under_review
    }
}

struct OrderHooks;

#[async_trait]
impl ResourceHooks<Order> for OrderHooks {
    async fn before_create(&self, data: &mut Map<String, Value>) -> HookOutcome {
        if let Some(email) = data.get_mut("email") {
            let lowered = email.as_str().map(str::to_lowercase);
            if let Some(lowered) = lowered {
                *email = Value::String(lowered);
            }
        }
        HookOutcome::Continue
    }

    async fn after_create(&self, order: &Order) {
        tracing::info!(id = %order.id, customer = %order.customer, "new order");
    }

    async fn before_update(&self, order: &mut Order, _data: &mut Map<String, Value>) -> HookOutcome {
        if order.status == "shipped" {
            return HookOutcome::Abort(ApiResponse::with_message(403, "shipped orders are read-only"));
        }
        HookOutcome::Continue
    }

    async fn before_delete(&self, order: &Order) -> HookOutcome {
        if order.status != "pending" {
            return HookOutcome::Abort(ApiResponse::with_message(403, "only pending orders can be deleted"));
        }
        HookOutcome::Continue
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_yaml_str(CONFIG)?;
    init_tracing(&config.logging.filter);

    let orders = ResourceController::builder(InMemoryStore::<Order>::new())
        .config(&config.resource("orders")?)
        .hooks(OrderHooks)
        .build();

    let ping = Router::new().route(
        "/ping",
        get(|| async { success_or_fail(true) }),
    );

    ServerBuilder::new()
        .register_resource(orders)
        .with_custom_routes(ping)
        .serve(&config.server.address())
        .await
}
