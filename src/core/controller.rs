//! Generic CRUD controller for one resource type
//!
//! A [`ResourceController`] is configured once (store, rules, filters, hooks,
//! page size) and is read-only afterwards, so a single instance can serve
//! concurrent requests behind an `Arc`.
//!
//! # Example
//!
//! ```rust,ignore
//! let controller = ResourceController::builder(InMemoryStore::<Order>::new())
//!     .create_rules(RuleSet::parse([("customer", "required|string"), ("total", "required|numeric")])?)
//!     .filters(FilterSpec::new().implicit("customer").explicit("min_total", Some("total"), Some(">=")))
//!     .hooks(OrderHooks)
//!     .build();
//!
//! let response = controller.list(&params).await;
//! ```

use crate::config::ResourceConfig;
use crate::core::entity::Resource;
use crate::core::error::{ControllerError, ControllerResult};
use crate::core::filter::{FilterSpec, apply_filters};
use crate::core::helpers::entity_short_name;
use crate::core::hooks::{HookOutcome, NoHooks, ResourceHooks};
use crate::core::query::{Page, PageRequest};
use crate::core::response::{ApiResponse, MESSAGE_DELETE_FAILED};
use crate::core::store::ResourceStore;
use crate::core::validation::{RuleSet, RuleValidator, Validator};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// Page size used when neither configuration nor the request set one
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Orchestrates list/show/create/update/delete/exists for `T`
pub struct ResourceController<T: Resource> {
    store: Arc<dyn ResourceStore<T>>,
    validator: Arc<dyn Validator>,
    hooks: Arc<dyn ResourceHooks<T>>,
    create_rules: RuleSet,
    update_rules: RuleSet,
    filters: FilterSpec,
    page_size: usize,
    label: String,
}

impl<T: Resource> ResourceController<T> {
    /// Start configuring a controller backed by `store`
    pub fn builder(store: impl ResourceStore<T> + 'static) -> ResourceControllerBuilder<T> {
        ResourceControllerBuilder::new(Arc::new(store))
    }

    pub fn create_rules(&self) -> &RuleSet {
        &self.create_rules
    }

    pub fn update_rules(&self) -> &RuleSet {
        &self.update_rules
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn store(&self) -> &Arc<dyn ResourceStore<T>> {
        &self.store
    }

    /// Filtered, paginated listing
    ///
    /// Responds 200 with `{data, pagination}`.
    pub async fn list(&self, params: &Map<String, Value>) -> ApiResponse {
        self.respond("list", self.try_list(params).await)
    }

    /// A single visible entity
    ///
    /// Responds 404 when the entity is missing or marked as exception,
    /// otherwise 200 with `{data}`.
    pub async fn show(&self, id: Uuid) -> ApiResponse {
        self.respond("show", self.try_show(id).await)
    }

    /// Validate and persist a new entity
    ///
    /// Responds 400 with `{fails}` on validation errors, the hook's response
    /// when `before_create` aborts, 500 when the store fails, otherwise 201
    /// with `{id}`.
    pub async fn create(&self, body: Map<String, Value>) -> ApiResponse {
        self.respond("create", self.try_create(body).await)
    }

    /// Partially update an entity
    ///
    /// The lookup runs before validation, so unknown ids answer 404
    /// whatever the body holds.
    pub async fn update(&self, id: Uuid, body: Map<String, Value>) -> ApiResponse {
        self.respond("update", self.try_update(id, body).await)
    }

    /// Delete an entity
    pub async fn delete(&self, id: Uuid) -> ApiResponse {
        self.respond("delete", self.try_delete(id).await)
    }

    /// Whether an entity exists, exception marker ignored
    ///
    /// Responds 200 with `{exists}`.
    pub async fn exists(&self, id: Uuid) -> ApiResponse {
        self.respond("exists", self.try_exists(id).await)
    }

    async fn try_list(&self, params: &Map<String, Value>) -> ControllerResult<ApiResponse> {
        let request = PageRequest::from_params(params, self.page_size);

        let mut query = self.store.query();
        let applied = apply_filters(&self.filters, params, &mut *query);
        tracing::debug!(
            resource = %self.label,
            filters = applied,
            page = request.page,
            size = request.size,
            "listing"
        );

        let Page {
            mut items,
            pagination,
        } = query.paginate(request.size, request.page).await?;

        self.hooks.before_list(&mut items).await;

        let mut data = Map::new();
        data.insert("data".to_string(), to_json(&items)?);
        data.insert("pagination".to_string(), to_json(&pagination)?);
        Ok(ApiResponse::build(200, data, ""))
    }

    async fn try_show(&self, id: Uuid) -> ControllerResult<ApiResponse> {
        let mut entity = self.find(id).await?;
        if entity.is_exception() {
            return Err(ControllerError::not_found::<T>(id));
        }

        self.hooks.before_show(&mut entity).await;

        Ok(ApiResponse::with_data(200, json!({ "data": to_json(&entity)? })))
    }

    async fn try_create(&self, mut data: Map<String, Value>) -> ControllerResult<ApiResponse> {
        self.validate(&data, &self.create_rules)?;

        if let HookOutcome::Abort(response) = self.hooks.before_create(&mut data).await {
            return Err(ControllerError::Aborted(response));
        }

        let created = self.store.create(data).await?;
        tracing::info!(resource = %self.label, id = %created.id(), "created");

        self.hooks.after_create(&created).await;

        Ok(ApiResponse::with_data(201, json!({ "id": created.id() })))
    }

    async fn try_update(&self, id: Uuid, mut data: Map<String, Value>) -> ControllerResult<ApiResponse> {
        let mut entity = self.find(id).await?;

        self.validate(&data, &self.update_rules)?;

        if let HookOutcome::Abort(response) = self.hooks.before_update(&mut entity, &mut data).await
        {
            return Err(ControllerError::Aborted(response));
        }

        if !self.store.update(&mut entity, data).await? {
            return Err(ControllerError::persistence::<T>("update"));
        }
        tracing::info!(resource = %self.label, %id, "updated");

        self.hooks.after_update(&entity).await;

        Ok(ApiResponse::new(200))
    }

    async fn try_delete(&self, id: Uuid) -> ControllerResult<ApiResponse> {
        let entity = self.find(id).await?;

        if let HookOutcome::Abort(response) = self.hooks.before_delete(&entity).await {
            return Err(ControllerError::Aborted(response));
        }

        let deleted = match self.store.delete(&entity).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!(resource = %self.label, %id, error = %e, "storage failure on delete");
                false
            }
        };
        if !deleted {
            return Err(ControllerError::PersistenceFailed {
                resource: T::resource_name_singular().to_string(),
                operation: "delete",
                message: Some(MESSAGE_DELETE_FAILED),
            });
        }
        tracing::info!(resource = %self.label, %id, "deleted");

        self.hooks.after_delete(&entity).await;

        Ok(ApiResponse::new(200))
    }

    async fn try_exists(&self, id: Uuid) -> ControllerResult<ApiResponse> {
        let exists = self.store.exists_by_id(&id).await?;
        Ok(ApiResponse::with_data(200, json!({ "exists": exists })))
    }

    async fn find(&self, id: Uuid) -> ControllerResult<T> {
        self.store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ControllerError::not_found::<T>(id))
    }

    fn validate(&self, data: &Map<String, Value>, rules: &RuleSet) -> ControllerResult<()> {
        let outcome = self.validator.validate(data, rules);
        if outcome.is_ok() {
            Ok(())
        } else {
            Err(ControllerError::ValidationFailed(outcome.errors))
        }
    }

    /// Convert the outcome of an operation into its envelope
    fn respond(&self, operation: &str, result: ControllerResult<ApiResponse>) -> ApiResponse {
        let err = match result {
            Ok(response) => return response,
            Err(err) => err,
        };

        match &err {
            ControllerError::Storage(e) => {
                tracing::error!(resource = %self.label, operation, error = %e, "storage failure");
            }
            ControllerError::PersistenceFailed { .. } => {
                tracing::warn!(resource = %self.label, operation, error = %err, "store refused write");
            }
            ControllerError::Aborted(response) => {
                tracing::debug!(resource = %self.label, operation, code = response.code(), "aborted by hook");
            }
            _ => {
                tracing::debug!(resource = %self.label, operation, error = %err, "request rejected");
            }
        }

        err.into()
    }
}

fn to_json<V: Serialize>(value: &V) -> ControllerResult<Value> {
    serde_json::to_value(value).map_err(|e| ControllerError::Storage(e.into()))
}

/// Builder for [`ResourceController`]
///
/// Update rules are derived in [`build`](Self::build) from the create rules
/// and the optional overrides.
pub struct ResourceControllerBuilder<T: Resource> {
    store: Arc<dyn ResourceStore<T>>,
    validator: Arc<dyn Validator>,
    hooks: Arc<dyn ResourceHooks<T>>,
    create_rules: RuleSet,
    update_overrides: Option<RuleSet>,
    filters: FilterSpec,
    page_size: usize,
}

impl<T: Resource> ResourceControllerBuilder<T> {
    pub fn new(store: Arc<dyn ResourceStore<T>>) -> Self {
        Self {
            store,
            validator: Arc::new(RuleValidator),
            hooks: Arc::new(NoHooks),
            create_rules: RuleSet::new(),
            update_overrides: None,
            filters: FilterSpec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn create_rules(mut self, rules: RuleSet) -> Self {
        self.create_rules = rules;
        self
    }

    /// Explicit update rules; their fields win over the derived ones
    pub fn update_rules(mut self, rules: RuleSet) -> Self {
        self.update_overrides = Some(rules);
        self
    }

    pub fn filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    /// Default page size when the request has no valid `size`
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    pub fn hooks(mut self, hooks: impl ResourceHooks<T> + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Take rules, filters and page size from a configuration entry
    pub fn config(mut self, config: &ResourceConfig) -> Self {
        self.create_rules = config.create_rules.clone();
        self.update_overrides = config.update_rules.clone();
        self.filters = config.filters.clone();
        if let Some(size) = config.page_size {
            self = self.page_size(size);
        }
        self
    }

    pub fn build(self) -> ResourceController<T> {
        let update_rules = self.create_rules.for_update(self.update_overrides.as_ref());

        ResourceController {
            store: self.store,
            validator: self.validator,
            hooks: self.hooks,
            create_rules: self.create_rules,
            update_rules,
            filters: self.filters,
            page_size: self.page_size,
            label: entity_short_name(std::any::type_name::<T>()),
        }
    }
}
