//! Thematic community detection.
//!
//! The primary detector greedily optimizes modularity on the undirected
//! projection of the graph (Louvain-style local node moves). Community
//! detection is inherently heuristic and non-unique; callers must not
//! assume a canonical partition.
//!
//! When a detector fails, the engine falls back to undirected connected
//! components: an explicit, warn-logged strategy switch recorded in the
//! result's `ClusterStrategy`, never a silent behavioral change.

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::config::EngineConfig;
use crate::similarity::TfIdfModel;

use super::models::{Cluster, ClusterStrategy, LiteratureGraph};
use super::stats::undirected_components;

/// Label used when a cluster has no usable text.
const UNKNOWN_THEME: &str = "unknown theme";

/// Number of top-weighted terms in a cluster label.
const LABEL_TERMS: usize = 3;

/// Strategy interface for partitioning the node set.
///
/// Implementations return a complete partition: every node index appears in
/// exactly one group. Returning `Err` triggers the engine's fallback chain.
pub trait CommunityDetector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Strategy tag recorded in the analysis result.
    fn strategy(&self) -> ClusterStrategy;

    fn detect(&self, graph: &LiteratureGraph) -> anyhow::Result<Vec<Vec<NodeIndex>>>;
}

// ============================================================================
// Modularity-optimizing detector (greedy local moves)
// ============================================================================

/// Greedy modularity optimization on the undirected projection.
pub struct ModularityDetector {
    pub resolution: f64,
    pub max_iterations: usize,
}

impl Default for ModularityDetector {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_iterations: 100,
        }
    }
}

impl CommunityDetector for ModularityDetector {
    fn name(&self) -> &'static str {
        "modularity"
    }

    fn strategy(&self) -> ClusterStrategy {
        ClusterStrategy::Modularity
    }

    fn detect(&self, graph: &LiteratureGraph) -> anyhow::Result<Vec<Vec<NodeIndex>>> {
        let g = &graph.graph;
        let n = g.node_count();
        if n == 0 {
            return Ok(vec![]);
        }

        // Undirected weighted adjacency lists
        let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut strengths: Vec<f64> = vec![0.0; n];
        for edge in g.edge_references() {
            let s = edge.source().index();
            let t = edge.target().index();
            let w = edge.weight().weight;
            adj[s].push((t, w));
            adj[t].push((s, w));
            strengths[s] += w;
            strengths[t] += w;
        }

        let total_weight: f64 = strengths.iter().sum::<f64>() / 2.0;
        if total_weight == 0.0 {
            // No edges: each node is its own community
            return Ok(g.node_indices().map(|idx| vec![idx]).collect());
        }

        // Start with each node in its own community; move nodes greedily
        // while modularity improves.
        let mut community: Vec<usize> = (0..n).collect();
        let mut community_strength: Vec<f64> = strengths.clone();
        let m2 = 2.0 * total_weight;

        let mut improved = true;
        let mut iterations = 0;
        while improved && iterations < self.max_iterations {
            improved = false;
            iterations += 1;

            for node in 0..n {
                let current = community[node];
                let ki = strengths[node];

                let mut neighbor_weights: HashMap<usize, f64> = HashMap::new();
                for &(neighbor, w) in &adj[node] {
                    *neighbor_weights.entry(community[neighbor]).or_default() += w;
                }

                let w_current = neighbor_weights.get(&current).copied().unwrap_or(0.0);
                let remove_cost = w_current / m2
                    - self.resolution * ki * (community_strength[current] - ki) / (m2 * m2);

                let mut best = current;
                let mut best_gain = 0.0;
                for (&target, &w_target) in &neighbor_weights {
                    if target == current {
                        continue;
                    }
                    let insert_cost = w_target / m2
                        - self.resolution * ki * community_strength[target] / (m2 * m2);
                    let gain = insert_cost - remove_cost;
                    if gain > best_gain {
                        best_gain = gain;
                        best = target;
                    }
                }

                if best != current {
                    community_strength[current] -= ki;
                    community_strength[best] += ki;
                    community[node] = best;
                    improved = true;
                }
            }
        }

        // Group node indices by final community
        let mut groups: HashMap<usize, Vec<NodeIndex>> = HashMap::new();
        for idx in g.node_indices() {
            groups.entry(community[idx.index()]).or_default().push(idx);
        }
        Ok(groups.into_values().collect())
    }
}

// ============================================================================
// Connected-components fallback
// ============================================================================

/// Fallback detector: undirected connected components.
pub struct ComponentDetector;

impl CommunityDetector for ComponentDetector {
    fn name(&self) -> &'static str {
        "connected_components"
    }

    fn strategy(&self) -> ClusterStrategy {
        ClusterStrategy::ConnectedComponents
    }

    fn detect(&self, graph: &LiteratureGraph) -> anyhow::Result<Vec<Vec<NodeIndex>>> {
        Ok(undirected_components(graph))
    }
}

// ============================================================================
// Orchestration: partition → report view
// ============================================================================

/// Run the detector chain and shape the winning partition into the capped,
/// labeled report view.
///
/// `texts` maps node ids to their similarity text (title + abstract); it
/// feeds the thematic labels.
pub fn detect_clusters(
    graph: &LiteratureGraph,
    config: &EngineConfig,
    texts: &HashMap<String, String>,
    detectors: &[Arc<dyn CommunityDetector>],
) -> (Vec<Cluster>, ClusterStrategy) {
    let (groups, strategy) = run_detectors(graph, detectors);

    // Stable shape: members sorted by id, groups by size desc then first id
    let mut named: Vec<Vec<String>> = groups
        .into_iter()
        .map(|group| {
            let mut ids: Vec<String> = group
                .into_iter()
                .map(|idx| graph.graph[idx].id.clone())
                .collect();
            ids.sort_unstable();
            ids
        })
        .collect();
    named.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a.first().cmp(&b.first()))
    });
    named.truncate(config.max_clusters);

    let clusters = named
        .into_iter()
        .enumerate()
        .map(|(i, members)| {
            let label = cluster_label(&members, texts);
            let size = members.len();
            let mut members = members;
            members.truncate(config.cluster_member_limit);
            Cluster {
                id: i as u32,
                size,
                members,
                label,
            }
        })
        .collect();

    (clusters, strategy)
}

fn run_detectors(
    graph: &LiteratureGraph,
    detectors: &[Arc<dyn CommunityDetector>],
) -> (Vec<Vec<NodeIndex>>, ClusterStrategy) {
    for (i, detector) in detectors.iter().enumerate() {
        match detector.detect(graph) {
            Ok(groups) => {
                if i > 0 {
                    warn!(
                        detector = detector.name(),
                        "community detection fell back after {} failed attempt(s)", i
                    );
                }
                return (groups, detector.strategy());
            }
            Err(error) => {
                warn!(
                    detector = detector.name(),
                    %error,
                    "community detector failed, trying next strategy"
                );
            }
        }
    }
    // The component partition always exists
    warn!("all configured detectors failed, using connected components");
    (
        undirected_components(graph),
        ClusterStrategy::ConnectedComponents,
    )
}

/// Top-weighted terms across the cluster's texts, using the same term
/// weighting as the similarity estimator restricted to the cluster.
fn cluster_label(members: &[String], texts: &HashMap<String, String>) -> String {
    let member_texts: Vec<String> = members
        .iter()
        .filter_map(|id| texts.get(id))
        .filter(|t| !t.is_empty())
        .cloned()
        .collect();
    if member_texts.is_empty() {
        return UNKNOWN_THEME.to_string();
    }

    let model = TfIdfModel::fit(&member_texts);
    let indices: Vec<usize> = (0..member_texts.len()).collect();
    let terms = model.top_terms(&indices, LABEL_TERMS);
    if terms.is_empty() {
        UNKNOWN_THEME.to_string()
    } else {
        terms.join(", ")
    }
}
