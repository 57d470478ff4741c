//! Error types for the Flood API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use floodwatch_geostore::StoreError;
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Flood API error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error fetching {resource}: {source}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: StoreError,
    },
}

impl Error {
    /// Wrap a storage failure with the name of the resource being served
    pub fn fetching(resource: &'static str) -> impl FnOnce(StoreError) -> Error {
        move |source| Error::Fetch { resource, source }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Fetch { resource, source } => {
                tracing::error!(resource = *resource, error = %source, "Storage query failed");
            }
        }

        let body = Json(json!({ "detail": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
