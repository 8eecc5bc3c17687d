//! Wire types for the backend API.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Response from `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Health indicator, `"healthy"` when the API is up.
    pub status: String,
    /// Human-readable detail.
    #[serde(default)]
    pub message: String,
}

/// Response from `POST /upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// Opaque id used to poll the processing job.
    pub job_id: String,
    /// Initial job status, `"processing"` on success.
    pub status: String,
    /// Number of data rows accepted from the CSV.
    #[serde(default)]
    pub rows_count: Option<u64>,
    /// Human-readable confirmation.
    #[serde(default)]
    pub message: String,
    /// Cluster count the backend settled on after clamping.
    #[serde(default)]
    pub cluster_count: Option<u32>,
}

/// Response from `GET /jobs/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Id of the polled job.
    pub job_id: String,
    /// Raw status string.
    pub status: String,
    /// Pipeline log captured so far.
    #[serde(default)]
    pub log: String,
}

impl JobStatusResponse {
    /// Interpret the raw status string.
    pub fn stage(&self) -> JobStage {
        JobStage::parse(&self.status)
    }
}

/// Lifecycle stage of a backend job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStage {
    /// The pipeline has been queued or is ingesting the CSV.
    Processing,
    /// The pipeline is actively clustering/analyzing.
    Running,
    /// All outputs have been written.
    Completed,
    /// The pipeline stopped with an error.
    Failed,
}

impl JobStage {
    /// Parse a backend status string. Unknown strings map to `Processing`
    /// so a backend that grows transient states keeps the client polling
    /// instead of erroring.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "running" => Self::Running,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Processing,
        }
    }

    /// Whether this stage keeps the status poller active.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Processing | Self::Running)
    }
}

/// One page of a paginated dataset endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetPage {
    /// Dataset identifier echoed by the backend.
    pub dataset: String,
    /// Row count across all pages.
    pub total_records: u64,
    /// Page count at the current page size.
    pub total_pages: u64,
    /// 1-based page that was returned.
    pub current_page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Row objects; column set depends on the dataset.
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Embedding payload for a single cluster inside `GET /clusters`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterEmbeddings {
    /// Number of records in the cluster (its size).
    pub count: usize,
    /// Dimensionality of each embedding vector.
    pub dimensions: usize,
    /// One vector per record.
    pub embeddings: Vec<Vec<f32>>,
}

/// Response from `GET /clusters`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClustersResponse {
    /// Number of clusters in the map.
    pub total_clusters: usize,
    /// Keyed `"cluster_N"`; ordered map so iteration is deterministic.
    pub clusters: BTreeMap<String, ClusterEmbeddings>,
}

/// Response from `GET /analysis/clusters/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterAnalysis {
    /// Numeric cluster id.
    pub cluster_id: u32,
    /// Analysis text for the cluster.
    pub analysis: String,
}

/// Response from the embeddings endpoints. The backend also sends `success`
/// and `shape`, which add nothing over `count`/`dimensions` and are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsData {
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// Number of vectors.
    pub count: usize,
    /// The vectors themselves.
    pub embeddings: Vec<Vec<f32>>,
}

/// Paginated datasets exposed by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetKind {
    /// Input rows after cleaning.
    CleanedResumes,
    /// Rows kept by the unbiasing pass.
    UnbiasedResumes,
    /// Rows filtered out by the unbiasing pass.
    RemovedEntries,
    /// Full dataset annotated with cluster assignments.
    AllClusters,
}

impl DatasetKind {
    /// URL path segment for the dataset.
    pub fn slug(self) -> &'static str {
        match self {
            Self::CleanedResumes => "cleaned_resumes",
            Self::UnbiasedResumes => "unbiased_resumes",
            Self::RemovedEntries => "removed_entries",
            Self::AllClusters => "all_clusters",
        }
    }
}

/// Downloadable artifacts exposed by `GET /download/{file_type}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Cleaned input CSV.
    CleanedResumes,
    /// Unbiased output CSV.
    UnbiasedResumes,
    /// Removed rows CSV.
    RemovedEntries,
    /// Cluster-annotated CSV.
    AllClusters,
    /// Raw embedding matrix.
    Embeddings,
    /// Unbiasing summary text.
    Summary,
}

impl ArtifactKind {
    /// All downloadable artifacts, in menu order.
    pub const ALL: [Self; 6] = [
        Self::CleanedResumes,
        Self::UnbiasedResumes,
        Self::RemovedEntries,
        Self::AllClusters,
        Self::Embeddings,
        Self::Summary,
    ];

    /// URL path segment for the artifact.
    pub fn slug(self) -> &'static str {
        match self {
            Self::CleanedResumes => "cleaned_resumes",
            Self::UnbiasedResumes => "unbiased_resumes",
            Self::RemovedEntries => "removed_entries",
            Self::AllClusters => "all_clusters",
            Self::Embeddings => "embeddings",
            Self::Summary => "summary",
        }
    }

    /// Filename suggested in the save dialog.
    pub fn suggested_file_name(self) -> &'static str {
        match self {
            Self::CleanedResumes => "cleaned_resumes.csv",
            Self::UnbiasedResumes => "unbiased_resumes.csv",
            Self::RemovedEntries => "removed_entries.csv",
            Self::AllClusters => "all_clusters.csv",
            Self::Embeddings => "resume_embeddings.npy",
            Self::Summary => "unbiasing_summary.txt",
        }
    }

    /// Label shown in the download menu.
    pub fn label(self) -> &'static str {
        match self {
            Self::CleanedResumes => "Cleaned resumes",
            Self::UnbiasedResumes => "Unbiased resumes",
            Self::RemovedEntries => "Removed entries",
            Self::AllClusters => "All clusters",
            Self::Embeddings => "Embeddings",
            Self::Summary => "Summary",
        }
    }
}

/// Extract the numeric id from a cluster key.
///
/// The backend is inconsistent about key shapes: `/clusters` uses
/// `"cluster_3"` while the bulk analyses file uses `"Cluster 3"`. Both parse
/// here.
pub fn cluster_numeric_id(key: &str) -> Option<u32> {
    let tail = key.rsplit(['_', ' ']).next()?;
    tail.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_response_shape() {
        let json = r#"
        {
          "message": "File uploaded successfully. Processing started.",
          "job_id": "9f0c2c2e-0000-4000-8000-abcdefabcdef",
          "rows_count": 2484,
          "status": "processing",
          "cluster_count": 6
        }"#;
        let parsed: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, "processing");
        assert_eq!(parsed.rows_count, Some(2484));
        assert_eq!(parsed.cluster_count, Some(6));
    }

    #[test]
    fn parses_job_status_without_log() {
        let json = r#"{"job_id": "abc", "status": "completed"}"#;
        let parsed: JobStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.stage(), JobStage::Completed);
        assert!(parsed.log.is_empty());
    }

    #[test]
    fn unknown_stage_keeps_polling() {
        assert_eq!(JobStage::parse("queued"), JobStage::Processing);
        assert!(JobStage::parse("queued").is_active());
        assert!(!JobStage::Failed.is_active());
    }

    #[test]
    fn parses_clusters_response_shape() {
        let json = r#"
        {
          "total_clusters": 2,
          "clusters": {
            "cluster_1": { "count": 10, "dimensions": 6, "embeddings": [[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]] },
            "cluster_2": { "count": 4, "dimensions": 6, "embeddings": [] }
          }
        }"#;
        let parsed: ClustersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total_clusters, 2);
        assert_eq!(parsed.clusters["cluster_1"].count, 10);
        assert_eq!(parsed.clusters["cluster_1"].embeddings[0].len(), 6);
    }

    #[test]
    fn cluster_keys_parse_both_shapes() {
        assert_eq!(cluster_numeric_id("cluster_3"), Some(3));
        assert_eq!(cluster_numeric_id("Cluster 12"), Some(12));
        assert_eq!(cluster_numeric_id("noise"), None);
    }

    #[test]
    fn embeddings_ignore_extra_backend_fields() {
        let json = r#"{
            "success": true,
            "shape": [1, 6],
            "dimensions": 6,
            "count": 1,
            "embeddings": [[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]]
        }"#;
        let parsed: EmbeddingsData = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.count, 1);
        assert_eq!(parsed.dimensions, 6);
    }
}
