//! Best-effort refresh of derived data after a job completes.
//!
//! One worker gathers everything the dashboard renders. Informational
//! endpoints already report absence as `None`; the embeddings endpoints are
//! hard calls whose failures are collected here instead of propagating, so
//! a secondary fetch failure never rolls back a completed job.

use std::collections::BTreeMap;

use tracing::warn;

use crate::api::{
    ApiClient, ClusterEmbeddings, DatasetKind, EmbeddingsData, cluster_numeric_id,
};

use super::jobs::ClusterDetailResult;

/// Page size used for the dataset row counts fetched on completion.
const REFRESH_PAGE_SIZE: u64 = 25;
/// Preview rows fetched when a cluster is selected.
const PREVIEW_PAGE_SIZE: u64 = 10;

/// Everything gathered by a completion refresh.
pub(crate) struct RefreshOutcome {
    pub(crate) clusters: Option<BTreeMap<String, ClusterEmbeddings>>,
    pub(crate) analyses: Option<BTreeMap<String, String>>,
    pub(crate) summary: Option<String>,
    pub(crate) unbiased: Option<EmbeddingsData>,
    pub(crate) removed: Option<EmbeddingsData>,
    pub(crate) unbiased_rows: Option<u64>,
    pub(crate) removed_rows: Option<u64>,
    pub(crate) errors: Vec<String>,
}

pub(crate) fn run_refresh(api: &ApiClient) -> RefreshOutcome {
    let mut errors = Vec::new();

    let clusters = api.clusters().map(|response| response.clusters);
    let analyses = api.cluster_analyses();
    let summary = api.summary();
    let unbiased_rows = api
        .dataset_page(DatasetKind::UnbiasedResumes, 1, REFRESH_PAGE_SIZE)
        .map(|page| page.total_records);
    let removed_rows = api
        .dataset_page(DatasetKind::RemovedEntries, 1, REFRESH_PAGE_SIZE)
        .map(|page| page.total_records);

    let unbiased = match api.unbiased_embeddings() {
        Ok(data) => Some(data),
        Err(err) => {
            errors.push(format!("unbiased embeddings: {err}"));
            None
        }
    };
    let removed = match api.removed_embeddings() {
        Ok(data) => Some(data),
        Err(err) => {
            errors.push(format!("removed embeddings: {err}"));
            None
        }
    };

    for error in &errors {
        warn!("Completion refresh: {error}");
    }

    RefreshOutcome {
        clusters,
        analyses,
        summary,
        unbiased,
        removed,
        unbiased_rows,
        removed_rows,
        errors,
    }
}

/// Fetch the analysis text and a record preview for one cluster.
pub(crate) fn run_cluster_detail(api: &ApiClient, cluster_id: u32) -> ClusterDetailResult {
    let analysis = api
        .cluster_analysis(cluster_id)
        .map(|detail| detail.analysis);
    let records_preview = api
        .cluster_page(cluster_id, 1, PREVIEW_PAGE_SIZE)
        .map(|page| {
            page.records
                .iter()
                .filter_map(record_label)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    ClusterDetailResult {
        cluster_id,
        analysis,
        records_preview,
    }
}

/// Pick a short human-readable label out of a dataset row.
fn record_label(record: &serde_json::Map<String, serde_json::Value>) -> Option<String> {
    const LABEL_COLUMNS: [&str; 3] = ["Category", "Resume_str", "ID"];
    for column in LABEL_COLUMNS {
        if let Some(value) = record.get(column) {
            let text = match value {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            let trimmed: String = text.chars().take(80).collect();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
    }
    None
}

/// Merge freshly fetched analyses into the cached map, normalizing the
/// inconsistent key shapes the backend produces.
pub(crate) fn merge_analyses(
    target: &mut BTreeMap<String, String>,
    fetched: BTreeMap<String, String>,
) {
    for (key, text) in fetched {
        let normalized = cluster_numeric_id(&key)
            .map(|id| format!("cluster_{id}"))
            .unwrap_or(key);
        target.insert(normalized, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_normalizes_analysis_keys() {
        let mut target = BTreeMap::new();
        merge_analyses(
            &mut target,
            BTreeMap::from([
                ("Cluster 1".to_string(), "tech".to_string()),
                ("cluster_2".to_string(), "finance".to_string()),
            ]),
        );
        assert_eq!(target.get("cluster_1").map(String::as_str), Some("tech"));
        assert_eq!(target.get("cluster_2").map(String::as_str), Some("finance"));
    }

    #[test]
    fn record_label_prefers_category_column() {
        let record: serde_json::Map<String, serde_json::Value> = serde_json::from_str(
            r#"{"ID": 7, "Category": "FINANCE", "Resume_str": "text"}"#,
        )
        .unwrap();
        assert_eq!(record_label(&record).unwrap(), "FINANCE");
    }

    #[test]
    fn record_label_truncates_long_text() {
        let long = "x".repeat(200);
        let record: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&format!(r#"{{"Resume_str": "{long}"}}"#)).unwrap();
        assert_eq!(record_label(&record).unwrap().len(), 80);
    }
}
