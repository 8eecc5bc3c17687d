//! Pure derivations from loaded data to render-friendly rows.

use std::collections::BTreeMap;

use crate::api::{ClusterEmbeddings, cluster_numeric_id};

/// Render row for one cluster that survived the size-ranked filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterSummary {
    /// Backend key, e.g. `"cluster_3"`.
    pub id: String,
    /// Numeric id parsed from the key, when the key carries one.
    pub numeric_id: Option<u32>,
    /// Cluster size (record count).
    pub size: usize,
    /// Embedding dimensionality.
    pub dimensions: usize,
}

/// Keep the `cluster_count` largest clusters, ordered by descending size.
///
/// Pure function of its two inputs. Ties break on the key so the result is
/// deterministic. Returns `None` when no cluster data is loaded, matching
/// the "no data yet" render path.
pub fn filter_clusters(
    clusters: Option<&BTreeMap<String, ClusterEmbeddings>>,
    cluster_count: u32,
) -> Option<Vec<ClusterSummary>> {
    let clusters = clusters?;
    let mut rows: Vec<ClusterSummary> = clusters
        .iter()
        .map(|(id, payload)| ClusterSummary {
            id: id.clone(),
            numeric_id: cluster_numeric_id(id),
            size: payload.count,
            dimensions: payload.dimensions,
        })
        .collect();
    rows.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.id.cmp(&b.id)));
    rows.truncate(cluster_count as usize);
    Some(rows)
}

/// Cache for [`filter_clusters`] keyed on its two inputs.
///
/// The render loop asks for the filtered view every frame; the cache
/// recomputes only when the cluster map is replaced (tracked by a version
/// counter) or the chosen count changes.
#[derive(Debug, Default)]
pub struct FilteredClusterCache {
    key: Option<(u64, u32)>,
    value: Option<Vec<ClusterSummary>>,
}

impl FilteredClusterCache {
    /// Return the filtered view, recomputing only on a key change.
    pub fn get(
        &mut self,
        data_version: u64,
        clusters: Option<&BTreeMap<String, ClusterEmbeddings>>,
        cluster_count: u32,
    ) -> Option<&[ClusterSummary]> {
        let key = (data_version, cluster_count);
        if self.key != Some(key) {
            self.value = filter_clusters(clusters, cluster_count);
            self.key = Some(key);
        }
        self.value.as_deref()
    }

    /// Drop the cached value so the next lookup recomputes.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(count: usize) -> ClusterEmbeddings {
        ClusterEmbeddings {
            count,
            dimensions: 6,
            embeddings: vec![vec![0.0; 6]; count],
        }
    }

    fn sample_map() -> BTreeMap<String, ClusterEmbeddings> {
        BTreeMap::from([
            ("cluster_A".to_string(), cluster(10)),
            ("cluster_B".to_string(), cluster(50)),
            ("cluster_C".to_string(), cluster(30)),
        ])
    }

    #[test]
    fn keeps_two_largest_with_payload_preserved() {
        let map = sample_map();
        let rows = filter_clusters(Some(&map), 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "cluster_B");
        assert_eq!(rows[0].size, 50);
        assert_eq!(rows[0].dimensions, 6);
        assert_eq!(rows[1].id, "cluster_C");
        assert_eq!(rows[1].size, 30);
    }

    #[test]
    fn returns_none_without_data() {
        assert!(filter_clusters(None, 2).is_none());
    }

    #[test]
    fn count_beyond_map_size_returns_everything() {
        let map = sample_map();
        let rows = filter_clusters(Some(&map), 10).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].id, "cluster_A");
    }

    #[test]
    fn ties_break_deterministically() {
        let map = BTreeMap::from([
            ("cluster_2".to_string(), cluster(5)),
            ("cluster_1".to_string(), cluster(5)),
        ]);
        let rows = filter_clusters(Some(&map), 2).unwrap();
        assert_eq!(rows[0].id, "cluster_1");
        assert_eq!(rows[1].id, "cluster_2");
    }

    #[test]
    fn cache_recomputes_only_on_key_change() {
        let mut cache = FilteredClusterCache::default();
        let map = sample_map();

        let first = cache.get(1, Some(&map), 2).unwrap().to_vec();
        assert_eq!(first.len(), 2);
        // Same key: the cached slice is handed back untouched.
        assert_eq!(cache.get(1, Some(&map), 2).unwrap(), first.as_slice());

        // New count recomputes.
        assert_eq!(cache.get(1, Some(&map), 3).unwrap().len(), 3);
        // New data version recomputes even with the same count.
        let mut bigger = map.clone();
        bigger.insert("cluster_D".to_string(), cluster(99));
        let rows = cache.get(2, Some(&bigger), 3).unwrap();
        assert_eq!(rows[0].id, "cluster_D");
    }
}
