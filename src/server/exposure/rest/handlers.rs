//! HTTP handlers for resource operations
//!
//! Handlers are generic over the resource type and only translate HTTP
//! input into controller calls. Every response, including extraction
//! failures, is an [`ApiResponse`] envelope.

use crate::core::controller::ResourceController;
use crate::core::entity::Resource;
use crate::core::error::ControllerError;
use crate::core::response::ApiResponse;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Controller shared by the routes of one resource
pub type ResourceState<T> = Arc<ResourceController<T>>;

type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;
type JsonBody = Result<Json<Value>, JsonRejection>;

/// GET /{plural}
pub async fn list<T: Resource>(
    State(controller): State<ResourceState<T>>,
    query: QueryPairs,
) -> ApiResponse {
    let Query(pairs) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    controller.list(&params_from_pairs(pairs)).await
}

/// POST /{plural}
pub async fn create<T: Resource>(
    State(controller): State<ResourceState<T>>,
    body: JsonBody,
) -> ApiResponse {
    match object_body(body) {
        Ok(data) => controller.create(data).await,
        Err(response) => response,
    }
}

/// GET /{plural}/{id}
pub async fn show<T: Resource>(
    State(controller): State<ResourceState<T>>,
    Path(id): Path<String>,
) -> ApiResponse {
    match parse_id::<T>(&id) {
        Ok(id) => controller.show(id).await,
        Err(response) => response,
    }
}

/// PUT|PATCH /{plural}/{id}
pub async fn update<T: Resource>(
    State(controller): State<ResourceState<T>>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResponse {
    let id = match parse_id::<T>(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match object_body(body) {
        Ok(data) => controller.update(id, data).await,
        Err(response) => response,
    }
}

/// DELETE /{plural}/{id}
pub async fn delete<T: Resource>(
    State(controller): State<ResourceState<T>>,
    Path(id): Path<String>,
) -> ApiResponse {
    match parse_id::<T>(&id) {
        Ok(id) => controller.delete(id).await,
        Err(response) => response,
    }
}

/// GET /{plural}/{id}/exists
pub async fn exists<T: Resource>(
    State(controller): State<ResourceState<T>>,
    Path(id): Path<String>,
) -> ApiResponse {
    match parse_id::<T>(&id) {
        Ok(id) => controller.exists(id).await,
        Err(response) => response,
    }
}

/// Collect query-string pairs into filter parameters
///
/// `key[]=a` always yields an array; a key repeated without brackets is
/// promoted to an array of its values.
pub fn params_from_pairs(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut params = Map::new();

    for (key, value) in pairs {
        let value = Value::String(value);
        match key.strip_suffix("[]") {
            Some(name) => match params.entry(name).or_insert_with(|| Value::Array(Vec::new())) {
                Value::Array(items) => items.push(value),
                existing => *existing = Value::Array(vec![existing.take(), value]),
            },
            None => match params.get_mut(&key) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => *existing = Value::Array(vec![existing.take(), value]),
                None => {
                    params.insert(key, value);
                }
            },
        }
    }

    params
}

/// Unparsable ids cannot name a stored entity
fn parse_id<T: Resource>(raw: &str) -> Result<Uuid, ApiResponse> {
    Uuid::parse_str(raw).map_err(|_| {
        tracing::debug!(resource = T::resource_name(), id = raw, "unparsable id");
        ApiResponse::new(404)
    })
}

fn object_body(body: JsonBody) -> Result<Map<String, Value>, ApiResponse> {
    match body {
        Ok(Json(Value::Object(data))) => Ok(data),
        Ok(Json(_)) => Err(bad_request("The request body must be a JSON object.".to_string())),
        Err(rejection) => Err(bad_request(rejection.body_text())),
    }
}

fn bad_request(reason: String) -> ApiResponse {
    ControllerError::ValidationFailed(vec![reason]).into()
}
