//! Data Transfer Objects for the REST API
//!
//! Component requests and responses live in [`crate::model`]; these are the
//! envelopes specific to the HTTP surface.

use serde::Serialize;

use crate::error::Error;

/// Response for listing components of one node type
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error body returned for every failed request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    /// Cluster call that failed, when the error came from the cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let context = error.context();
        Self {
            error: error.reason(),
            message: error.to_string(),
            operation: context.map(|c| c.operation.to_string()),
            kind: context.map(|c| c.kind.kind().to_string()),
            name: context.and_then(|c| c.name.clone()),
        }
    }
}
