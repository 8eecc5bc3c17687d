//! HTTP client methods, one per backend capability.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::http_client;

use super::multipart::MultipartBuilder;
use super::types::{
    ArtifactKind, ClusterAnalysis, ClustersResponse, DatasetKind, DatasetPage, EmbeddingsData,
    HealthResponse, JobStatusResponse, UploadResponse,
};
use super::ApiError;

/// JSON payloads (cluster embedding maps) can run to tens of megabytes.
const MAX_JSON_BYTES: usize = 256 * 1024 * 1024;
/// Downloaded artifacts share the same cap.
const MAX_DOWNLOAD_BYTES: usize = 256 * 1024 * 1024;
/// Error bodies only need enough room for a message.
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Deserialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Thin wrapper over the backend REST API.
///
/// Methods are side-effect-free beyond the network call itself; each call
/// hits the network every time.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL (including the `/api` prefix).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`.
    pub fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get_json("/health")
    }

    /// `POST /upload` with the CSV bytes and the chosen cluster count.
    pub fn upload_dataset(
        &self,
        file_name: &str,
        contents: &[u8],
        cluster_count: u32,
    ) -> Result<UploadResponse, ApiError> {
        let body = MultipartBuilder::new()
            .text_field("cluster_count", &cluster_count.to_string())
            .file_field("file", file_name, "text/csv", contents)
            .finish();
        let url = self.endpoint("/upload");
        let response = http_client::agent()
            .post(&url)
            .set("Content-Type", &body.content_type())
            .send_bytes(body.bytes())
            .map_err(map_call_error)?;
        decode_json("/upload", response)
    }

    /// `GET /jobs/{id}/status`.
    pub fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError> {
        self.get_json(&format!("/jobs/{job_id}/status"))
    }

    /// `GET /{dataset}?page=&page_size=`. Informational: absence is `None`.
    pub fn dataset_page(
        &self,
        dataset: DatasetKind,
        page: u64,
        page_size: u64,
    ) -> Option<DatasetPage> {
        self.get_json_soft(&format!(
            "/{}?page={page}&page_size={page_size}",
            dataset.slug()
        ))
    }

    /// `GET /clusters`. Informational: absence is `None`.
    pub fn clusters(&self) -> Option<ClustersResponse> {
        self.get_json_soft("/clusters")
    }

    /// `GET /clusters/{id}?page=&page_size=`. Informational.
    pub fn cluster_page(&self, cluster_id: u32, page: u64, page_size: u64) -> Option<DatasetPage> {
        self.get_json_soft(&format!(
            "/clusters/{cluster_id}?page={page}&page_size={page_size}"
        ))
    }

    /// `GET /analysis/clusters`. Informational.
    pub fn cluster_analyses(&self) -> Option<BTreeMap<String, String>> {
        self.get_json_soft("/analysis/clusters")
    }

    /// `GET /analysis/clusters/{id}`. Informational.
    pub fn cluster_analysis(&self, cluster_id: u32) -> Option<ClusterAnalysis> {
        self.get_json_soft(&format!("/analysis/clusters/{cluster_id}"))
    }

    /// `GET /summary`. Informational.
    pub fn summary(&self) -> Option<String> {
        self.get_json_soft::<SummaryResponse>("/summary")
            .map(|response| response.summary)
    }

    /// `GET /unbiased_embeddings_data`.
    pub fn unbiased_embeddings(&self) -> Result<EmbeddingsData, ApiError> {
        self.get_json("/unbiased_embeddings_data")
    }

    /// `GET /removed_embeddings_data`.
    pub fn removed_embeddings(&self) -> Result<EmbeddingsData, ApiError> {
        self.get_json("/removed_embeddings_data")
    }

    /// `GET /download/{file_type}`, returning the raw body.
    pub fn download(&self, artifact: ArtifactKind) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&format!("/download/{}", artifact.slug()));
        let response = http_client::agent()
            .get(&url)
            .call()
            .map_err(map_call_error)?;
        Ok(http_client::read_response_bytes(
            response,
            MAX_DOWNLOAD_BYTES,
        )?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        let response = http_client::agent()
            .get(&url)
            .call()
            .map_err(map_call_error)?;
        decode_json(path, response)
    }

    /// Soft variant used by informational endpoints: any failure is logged
    /// and reported as missing data, never as an error.
    fn get_json_soft<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Option<T> {
        match self.get_json(path) {
            Ok(value) => Some(value),
            Err(ApiError::Status { status: 404, .. }) => {
                warn!("{path} not available yet (404)");
                None
            }
            Err(err) => {
                warn!("Fetching {path} failed: {err}");
                None
            }
        }
    }
}

fn decode_json<T: for<'de> Deserialize<'de>>(
    endpoint: &str,
    response: ureq::Response,
) -> Result<T, ApiError> {
    let bytes = http_client::read_response_bytes(response, MAX_JSON_BYTES)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    })
}

fn map_call_error(error: ureq::Error) -> ApiError {
    match error {
        ureq::Error::Status(status, response) => ApiError::Status {
            status,
            message: extract_error_message(response, status),
        },
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

/// Pull the backend's `{"error": ...}` message out of a failure body when
/// present, falling back to the bare status code.
fn extract_error_message(response: ureq::Response, status: u16) -> String {
    let fallback = format!("HTTP {status}");
    let Ok(bytes) = http_client::read_response_bytes(response, MAX_ERROR_BODY_BYTES) else {
        return fallback;
    };
    match serde_json::from_slice::<ErrorBody>(&bytes) {
        Ok(body) => body.error,
        Err(_) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 16 * 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    fn json_response(status_line: &str, body: &str) -> String {
        format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn health_parses_success_body() {
        let body = r#"{"status": "healthy", "message": "API is running"}"#;
        let url = serve_once(json_response("HTTP/1.1 200 OK", body));
        let client = ApiClient::new(url);
        let health = client.health().unwrap();
        assert_eq!(health.status, "healthy");
    }

    #[test]
    fn hard_error_carries_backend_message() {
        let body = r#"{"error": "Only CSV files are supported"}"#;
        let url = serve_once(json_response("HTTP/1.1 400 BAD REQUEST", body));
        let client = ApiClient::new(url);
        let err = client.job_status("abc").unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Only CSV files are supported");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn soft_endpoint_treats_404_as_absent() {
        let body = r#"{"error": "Unbiasing summary not found"}"#;
        let url = serve_once(json_response("HTTP/1.1 404 NOT FOUND", body));
        let client = ApiClient::new(url);
        assert!(client.summary().is_none());
    }

    #[test]
    fn soft_endpoint_treats_transport_failure_as_absent() {
        // Nothing is listening on this port.
        let client = ApiClient::new("http://127.0.0.1:9/api");
        assert!(client.clusters().is_none());
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let url = serve_once(json_response("HTTP/1.1 200 OK", "not json"));
        let client = ApiClient::new(url);
        let err = client.health().unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:3002/api/");
        assert_eq!(client.base_url(), "http://localhost:3002/api");
    }
}
