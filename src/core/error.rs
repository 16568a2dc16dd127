//! Typed errors for controller operations, rules and configuration
//!
//! Controller operations run internally as `Result<ApiResponse, ControllerError>`
//! and every error is converted to an envelope at the operation boundary, so
//! callers always receive a well-formed [`ApiResponse`].
//!
//! # Example
//!
//! ```rust,ignore
//! let entity = store
//!     .find_by_id(&id)
//!     .await?
//!     .ok_or_else(|| ControllerError::not_found::<Order>(id))?;
//! ```

use crate::core::entity::Resource;
use crate::core::response::{ApiResponse, MESSAGE_INVALID_PARAMETERS};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Failure of a controller operation
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Entity absent, or hidden by its exception marker
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: Uuid },

    /// One or more field rules failed
    #[error("validation failed: {}", .0.join(", "))]
    ValidationFailed(Vec<String>),

    /// The store reported that a write did not happen
    #[error("failed to {operation} {resource}")]
    PersistenceFailed {
        resource: String,
        operation: &'static str,
        message: Option<&'static str>,
    },

    /// The store returned an error
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// A before-hook stopped the operation with its own response
    #[error("operation aborted by hook with status {}", .0.code())]
    Aborted(ApiResponse),
}

impl ControllerError {
    pub fn not_found<T: Resource>(id: Uuid) -> Self {
        ControllerError::NotFound {
            resource: T::resource_name_singular().to_string(),
            id,
        }
    }

    pub fn persistence<T: Resource>(operation: &'static str) -> Self {
        ControllerError::PersistenceFailed {
            resource: T::resource_name_singular().to_string(),
            operation,
            message: None,
        }
    }

    /// The HTTP code this error is reported with
    pub fn code(&self) -> u16 {
        match self {
            ControllerError::NotFound { .. } => 404,
            ControllerError::ValidationFailed(_) => 400,
            ControllerError::PersistenceFailed { .. } => 500,
            ControllerError::Storage(_) => 500,
            ControllerError::Aborted(response) => response.code(),
        }
    }
}

impl From<ControllerError> for ApiResponse {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::NotFound { .. } => ApiResponse::new(404),
            ControllerError::ValidationFailed(fails) => {
                let mut data = Map::new();
                data.insert(
                    "fails".to_string(),
                    Value::Array(fails.into_iter().map(Value::String).collect()),
                );
                ApiResponse::build(400, data, MESSAGE_INVALID_PARAMETERS)
            }
            ControllerError::PersistenceFailed { message, .. } => {
                ApiResponse::build(500, Map::new(), message.unwrap_or_default())
            }
            ControllerError::Storage(_) => ApiResponse::new(500),
            ControllerError::Aborted(response) => response,
        }
    }
}

/// Malformed rule declaration
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule '{rule}' requires an argument")]
    MissingArgument { rule: String },

    #[error("invalid argument '{argument}' for rule '{rule}'")]
    InvalidArgument { rule: String, argument: String },

    #[error("invalid pattern for rule 'regex': {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Errors while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("resource '{0}' is not declared in the configuration")]
    UnknownResource(String),
}

/// A specialized Result type for controller internals
pub type ControllerResult<T> = Result<T, ControllerError>;
