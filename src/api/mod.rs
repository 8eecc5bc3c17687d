//! Client for the unbiasing backend REST API.
//!
//! One method per backend capability, no retries and no caching. Endpoints
//! split into two error classes: "hard" calls (upload, job status,
//! embeddings, downloads) surface a typed [`ApiError`] so the UI can flip
//! into its error state, while "informational" calls (datasets, clusters,
//! analyses, summary) treat 404s and transport failures as data that is not
//! available yet and return `None` after logging.

mod client;
mod multipart;
mod types;

pub use client::ApiClient;
pub use types::{
    ArtifactKind, ClusterAnalysis, ClusterEmbeddings, ClustersResponse, DatasetKind, DatasetPage,
    EmbeddingsData, HealthResponse, JobStage, JobStatusResponse, UploadResponse, cluster_numeric_id,
};

use thiserror::Error;

/// Errors surfaced by hard API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (connection refused,
    /// timeout, DNS failure).
    #[error("Could not reach backend: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body when present.
        message: String,
    },
    /// The response body did not match the expected shape.
    #[error("Malformed response from {endpoint}: {message}")]
    Decode {
        /// Endpoint path that produced the body.
        endpoint: String,
        /// Parser error text.
        message: String,
    },
    /// The response body could not be read (truncated or over the size cap).
    #[error("Failed to read response body: {0}")]
    Body(#[from] std::io::Error),
}
