//! End-to-end tests of the controller lifecycle
//!
//! A recording store wraps the in-memory store so the tests can assert which
//! persistence calls were (or were not) made, and scripted hooks record the
//! order in which they ran.

use anyhow::{Result, anyhow};
use resource_controller::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// Test Entity
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Product {
    id: Uuid,
    name: String,
    price: f64,
    #[serde(default)]
    hidden: bool,
}

impl Resource for Product {
    fn resource_name() -> &'static str {
        "products"
    }

    fn resource_name_singular() -> &'static str {
        "product"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_exception(&self) -> bool {
        self.hidden
    }
}

fn product(name: &str, price: f64, hidden: bool) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
        hidden,
    }
}

fn body(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

// =============================================================================
// Recording Store
// =============================================================================

#[derive(Default)]
struct Calls {
    find: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

/// In-memory store that counts calls and can be told to refuse or fail
#[derive(Clone)]
struct RecordingStore {
    inner: InMemoryStore<Product>,
    calls: Arc<Calls>,
    refuse_writes: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl RecordingStore {
    fn new(items: Vec<Product>) -> Self {
        Self {
            inner: InMemoryStore::with_items(items),
            calls: Arc::new(Calls::default()),
            refuse_writes: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    fn refusing(self) -> Self {
        self.refuse_writes.store(true, Ordering::SeqCst);
        self
    }

    fn failing(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> Result<bool> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset"));
        }
        Ok(!self.refuse_writes.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl ResourceStore<Product> for RecordingStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Product>> {
        self.calls.find.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn create(&self, fields: Map<String, Value>) -> Result<Product> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        self.inner.create(fields).await
    }

    async fn update(&self, entity: &mut Product, fields: Map<String, Value>) -> Result<bool> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        if !self.check_write()? {
            return Ok(false);
        }
        self.inner.update(entity, fields).await
    }

    async fn delete(&self, entity: &Product) -> Result<bool> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        if !self.check_write()? {
            return Ok(false);
        }
        self.inner.delete(entity).await
    }

    fn query(&self) -> Box<dyn QueryBuilder<Product>> {
        self.inner.query()
    }

    async fn exists_by_id(&self, id: &Uuid) -> Result<bool> {
        self.inner.exists_by_id(id).await
    }
}

// =============================================================================
// Recording Hooks
// =============================================================================

/// Hooks that log every stage and optionally abort one of them
#[derive(Clone, Default)]
struct ScriptedHooks {
    log: Arc<Mutex<Vec<&'static str>>>,
    abort_on: Option<&'static str>,
}

impl ScriptedHooks {
    fn aborting(stage: &'static str) -> Self {
        Self {
            abort_on: Some(stage),
            ..Self::default()
        }
    }

    fn record(&self, stage: &'static str) -> HookOutcome {
        self.log.lock().unwrap().push(stage);
        if self.abort_on == Some(stage) {
            HookOutcome::Abort(ApiResponse::with_message(409, "blocked by hook"))
        } else {
            HookOutcome::Continue
        }
    }

    fn stages(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceHooks<Product> for ScriptedHooks {
    async fn before_list(&self, items: &mut Vec<Product>) {
        self.record("before_list");
        for item in items.iter_mut() {
            item.name = item.name.to_uppercase();
        }
    }

    async fn before_show(&self, entity: &mut Product) {
        self.record("before_show");
        entity.name = format!("{}!", entity.name);
    }

    async fn before_create(&self, data: &mut Map<String, Value>) -> HookOutcome {
        if let Some(name) = data.get_mut("name") {
            let trimmed = name.as_str().map(|s| s.trim().to_string());
            if let Some(trimmed) = trimmed {
                *name = Value::String(trimmed);
            }
        }
        self.record("before_create")
    }

    async fn after_create(&self, _entity: &Product) {
        self.record("after_create");
    }

    async fn before_update(&self, _entity: &mut Product, _data: &mut Map<String, Value>) -> HookOutcome {
        self.record("before_update")
    }

    async fn after_update(&self, _entity: &Product) {
        self.record("after_update");
    }

    async fn before_delete(&self, _entity: &Product) -> HookOutcome {
        self.record("before_delete")
    }

    async fn after_delete(&self, _entity: &Product) {
        self.record("after_delete");
    }
}

fn rules() -> RuleSet {
    RuleSet::parse([
        ("name", "required|string|max:40"),
        ("price", "required|numeric|min:0"),
    ])
    .unwrap()
}

fn controller(store: RecordingStore, hooks: ScriptedHooks) -> ResourceController<Product> {
    ResourceController::builder(store)
        .create_rules(rules())
        .filters(
            FilterSpec::new()
                .implicit("name")
                .explicit("min_price", Some("price"), Some(">=")),
        )
        .page_size(2)
        .hooks(hooks)
        .build()
}

// =============================================================================
// Create
// =============================================================================

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_201_with_id() {
        let store = RecordingStore::new(vec![]);
        let hooks = ScriptedHooks::default();
        let controller = controller(store.clone(), hooks.clone());

        let response = controller
            .create(body(json!({ "name": "  Lamp ", "price": 12.5 })))
            .await;

        assert_eq!(response.code(), 201);
        assert_eq!(response.status(), "Sucesso");
        assert_eq!(response.message(), "Created");

        let id: Uuid = serde_json::from_value(response.get("id").cloned().unwrap()).unwrap();
        let stored = store.inner.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Lamp");
        assert_eq!(hooks.stages(), vec!["before_create", "after_create"]);
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_storage() {
        let store = RecordingStore::new(vec![]);
        let hooks = ScriptedHooks::default();
        let controller = controller(store.clone(), hooks.clone());

        let response = controller.create(body(json!({ "price": -3 }))).await;

        assert_eq!(response.code(), 400);
        assert_eq!(response.status(), "Erro");
        assert_eq!(response.message(), "invalid parameters");
        let fails = response.get("fails").and_then(Value::as_array).unwrap();
        assert_eq!(fails.len(), 2);
        assert_eq!(RecordingStore::count(&store.calls.create), 0);
        assert!(hooks.stages().is_empty());
    }

    #[tokio::test]
    async fn test_before_create_abort_skips_persistence() {
        let store = RecordingStore::new(vec![]);
        let hooks = ScriptedHooks::aborting("before_create");
        let controller = controller(store.clone(), hooks.clone());

        let response = controller
            .create(body(json!({ "name": "Lamp", "price": 1 })))
            .await;

        assert_eq!(response.code(), 409);
        assert_eq!(response.message(), "blocked by hook");
        assert_eq!(RecordingStore::count(&store.calls.create), 0);
        assert_eq!(hooks.stages(), vec!["before_create"]);
    }

    #[tokio::test]
    async fn test_storage_error_is_500() {
        let store = RecordingStore::new(vec![]).failing();
        let hooks = ScriptedHooks::default();
        let controller = controller(store.clone(), hooks.clone());

        let response = controller
            .create(body(json!({ "name": "Lamp", "price": 1 })))
            .await;

        assert_eq!(response.code(), 500);
        assert_eq!(response.message(), "Internal Error");
        assert_eq!(hooks.stages(), vec!["before_create"]);
    }
}

// =============================================================================
// Show / Exists
// =============================================================================

mod show_tests {
    use super::*;

    #[tokio::test]
    async fn test_show_runs_before_show() {
        let lamp = product("Lamp", 10.0, false);
        let store = RecordingStore::new(vec![lamp.clone()]);
        let hooks = ScriptedHooks::default();
        let controller = controller(store, hooks.clone());

        let response = controller.show(lamp.id).await;

        assert_eq!(response.code(), 200);
        assert_eq!(response.message(), "OK");
        assert_eq!(response.get("data").unwrap()["name"], "Lamp!");
        assert_eq!(hooks.stages(), vec!["before_show"]);
    }

    #[tokio::test]
    async fn test_show_unknown_id_is_404() {
        let controller = controller(RecordingStore::new(vec![]), ScriptedHooks::default());

        let response = controller.show(Uuid::new_v4()).await;

        assert_eq!(response.code(), 404);
        assert_eq!(response.status(), "Erro");
        assert_eq!(response.message(), "Not Found");
    }

    #[tokio::test]
    async fn test_exception_entity_exists_but_is_not_shown() {
        let secret = product("Secret", 1.0, true);
        let hooks = ScriptedHooks::default();
        let controller = controller(RecordingStore::new(vec![secret.clone()]), hooks.clone());

        let shown = controller.show(secret.id).await;
        let exists = controller.exists(secret.id).await;

        assert_eq!(shown.code(), 404);
        assert_eq!(exists.code(), 200);
        assert_eq!(exists.get("exists"), Some(&json!(true)));
        assert!(hooks.stages().is_empty());
    }

    #[tokio::test]
    async fn test_exists_false_for_unknown_id() {
        let controller = controller(RecordingStore::new(vec![]), ScriptedHooks::default());

        let response = controller.exists(Uuid::new_v4()).await;

        assert_eq!(response.code(), 200);
        assert_eq!(response.get("exists"), Some(&json!(false)));
    }
}

// =============================================================================
// Update
// =============================================================================

mod update_tests {
    use super::*;

    #[tokio::test]
    async fn test_update_unknown_id_is_404_before_validation() {
        let store = RecordingStore::new(vec![]);
        let controller = controller(store.clone(), ScriptedHooks::default());

        // The body would fail validation; lookup wins
        let response = controller
            .update(Uuid::new_v4(), body(json!({ "price": "not a number" })))
            .await;

        assert_eq!(response.code(), 404);
        assert!(response.get("fails").is_none());
        assert_eq!(RecordingStore::count(&store.calls.find), 1);
        assert_eq!(RecordingStore::count(&store.calls.update), 0);
    }

    #[tokio::test]
    async fn test_partial_update_uses_derived_rules() {
        let lamp = product("Lamp", 10.0, false);
        let store = RecordingStore::new(vec![lamp.clone()]);
        let hooks = ScriptedHooks::default();
        let controller = controller(store.clone(), hooks.clone());

        let response = controller.update(lamp.id, body(json!({ "price": 15 }))).await;

        assert_eq!(response.code(), 200);
        assert_eq!(response.status(), "Sucesso");
        let stored = store.inner.find_by_id(&lamp.id).await.unwrap().unwrap();
        assert_eq!(stored.price, 15.0);
        assert_eq!(stored.name, "Lamp");
        assert_eq!(hooks.stages(), vec!["before_update", "after_update"]);
    }

    #[tokio::test]
    async fn test_update_still_checks_constraints() {
        let lamp = product("Lamp", 10.0, false);
        let store = RecordingStore::new(vec![lamp.clone()]);
        let controller = controller(store.clone(), ScriptedHooks::default());

        let response = controller.update(lamp.id, body(json!({ "price": -1 }))).await;

        assert_eq!(response.code(), 400);
        assert_eq!(RecordingStore::count(&store.calls.update), 0);
    }

    #[tokio::test]
    async fn test_refused_update_is_500_without_after_hook() {
        let lamp = product("Lamp", 10.0, false);
        let store = RecordingStore::new(vec![lamp.clone()]).refusing();
        let hooks = ScriptedHooks::default();
        let controller = controller(store, hooks.clone());

        let response = controller.update(lamp.id, body(json!({ "price": 15 }))).await;

        assert_eq!(response.code(), 500);
        assert_eq!(hooks.stages(), vec!["before_update"]);
    }

    #[tokio::test]
    async fn test_before_update_abort() {
        let lamp = product("Lamp", 10.0, false);
        let store = RecordingStore::new(vec![lamp.clone()]);
        let controller = controller(store.clone(), ScriptedHooks::aborting("before_update"));

        let response = controller.update(lamp.id, body(json!({ "price": 15 }))).await;

        assert_eq!(response.code(), 409);
        assert_eq!(RecordingStore::count(&store.calls.update), 0);
    }

    #[tokio::test]
    async fn test_explicit_update_rule_overrides_derived_one() {
        let lamp = product("Lamp", 10.0, false);
        let controller = ResourceController::builder(RecordingStore::new(vec![lamp.clone()]))
            .create_rules(rules())
            .update_rules(RuleSet::parse([("name", "required|string")]).unwrap())
            .build();

        let response = controller.update(lamp.id, body(json!({ "price": 3 }))).await;

        assert_eq!(response.code(), 400);
        assert_eq!(
            response.get("fails"),
            Some(&json!(["The name field is required."]))
        );
    }
}

// =============================================================================
// Delete
// =============================================================================

mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete() {
        let lamp = product("Lamp", 10.0, false);
        let store = RecordingStore::new(vec![lamp.clone()]);
        let hooks = ScriptedHooks::default();
        let controller = controller(store.clone(), hooks.clone());

        let response = controller.delete(lamp.id).await;

        assert_eq!(response.code(), 200);
        assert!(!store.inner.exists_by_id(&lamp.id).await.unwrap());
        assert_eq!(hooks.stages(), vec!["before_delete", "after_delete"]);
    }

    #[tokio::test]
    async fn test_refused_delete_is_500_without_after_hook() {
        let lamp = product("Lamp", 10.0, false);
        let store = RecordingStore::new(vec![lamp.clone()]).refusing();
        let hooks = ScriptedHooks::default();
        let controller = controller(store.clone(), hooks.clone());

        let response = controller.delete(lamp.id).await;

        assert_eq!(response.code(), 500);
        assert_eq!(response.status(), "Erro");
        assert_eq!(response.message(), "problem deleting object");
        assert_eq!(RecordingStore::count(&store.calls.delete), 1);
        assert_eq!(hooks.stages(), vec!["before_delete"]);
    }

    #[tokio::test]
    async fn test_failing_delete_reports_the_same_envelope() {
        let lamp = product("Lamp", 10.0, false);
        let controller = controller(
            RecordingStore::new(vec![lamp.clone()]).failing(),
            ScriptedHooks::default(),
        );

        let response = controller.delete(lamp.id).await;

        assert_eq!(response.code(), 500);
        assert_eq!(response.message(), "problem deleting object");
    }

    #[tokio::test]
    async fn test_before_delete_abort_keeps_entity() {
        let lamp = product("Lamp", 10.0, false);
        let store = RecordingStore::new(vec![lamp.clone()]);
        let controller = controller(store.clone(), ScriptedHooks::aborting("before_delete"));

        let response = controller.delete(lamp.id).await;

        assert_eq!(response.code(), 409);
        assert_eq!(RecordingStore::count(&store.calls.delete), 0);
        assert!(store.inner.exists_by_id(&lamp.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_404() {
        let store = RecordingStore::new(vec![]);
        let controller = controller(store.clone(), ScriptedHooks::default());

        let response = controller.delete(Uuid::new_v4()).await;

        assert_eq!(response.code(), 404);
        assert_eq!(RecordingStore::count(&store.calls.delete), 0);
    }
}

// =============================================================================
// List
// =============================================================================

mod list_tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            product("lamp", 10.0, false),
            product("desk", 120.0, false),
            product("chair", 45.0, false),
            product("lamp", 25.0, false),
        ]
    }

    #[tokio::test]
    async fn test_list_paginates_with_default_size() {
        let hooks = ScriptedHooks::default();
        let controller = controller(RecordingStore::new(catalog()), hooks.clone());

        let response = controller.list(&Map::new()).await;

        assert_eq!(response.code(), 200);
        let data = response.get("data").and_then(Value::as_array).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "LAMP");
        let pagination = response.get("pagination").unwrap();
        assert_eq!(pagination["total"], 4);
        assert_eq!(pagination["limit"], 2);
        assert_eq!(pagination["has_next"], true);
        assert_eq!(hooks.stages(), vec!["before_list"]);
    }

    #[tokio::test]
    async fn test_list_applies_declared_filters_only() {
        let controller = controller(RecordingStore::new(catalog()), ScriptedHooks::default());

        let params = body(json!({ "min_price": "20", "price": "10", "size": "10" }));
        let response = controller.list(&params).await;

        let names: Vec<&str> = response
            .get("data")
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .filter_map(|item| item["name"].as_str())
            .collect();
        assert_eq!(names, vec!["DESK", "CHAIR", "LAMP"]);
    }

    #[tokio::test]
    async fn test_list_membership_filter() {
        let controller = controller(RecordingStore::new(catalog()), ScriptedHooks::default());

        let params = body(json!({ "name": ["lamp", "chair"], "size": 10 }));
        let response = controller.list(&params).await;

        assert_eq!(response.get("pagination").unwrap()["total"], 3);
    }

    #[tokio::test]
    async fn test_list_second_page() {
        let controller = controller(RecordingStore::new(catalog()), ScriptedHooks::default());

        let response = controller.list(&body(json!({ "page": "2" }))).await;

        let pagination = response.get("pagination").unwrap();
        assert_eq!(pagination["page"], 2);
        assert_eq!(pagination["has_prev"], true);
        assert_eq!(pagination["has_next"], false);
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config_tests {
    use super::*;

    #[tokio::test]
    async fn test_controller_from_config() {
        let config = AppConfig::from_yaml_str(
            r#"
database:
  page_size: 3
resources:
  products:
    create_rules:
      name: required|string
    filters: [name]
"#,
        )
        .unwrap();
        let resource = config.resource("products").unwrap();

        let controller = ResourceController::builder(RecordingStore::new(vec![]))
            .config(&resource)
            .build();

        assert_eq!(controller.page_size(), 3);
        assert!(controller.create_rules().get("name").unwrap().is_required());
        assert!(!controller.update_rules().get("name").unwrap().is_required());
        assert_eq!(controller.filters().len(), 1);

        let response = controller.create(body(json!({ "price": 1 }))).await;
        assert_eq!(response.code(), 400);
    }
}

#[test]
fn test_success_or_fail() {
    assert_eq!(success_or_fail(true).code(), 200);
    assert_eq!(success_or_fail(false).code(), 500);
    assert_eq!(success_or_fail(false).status(), "Erro");
}
