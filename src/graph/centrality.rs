//! Node importance ranking.
//!
//! Three complementary signals (degree, betweenness, PageRank) are min-max
//! normalized and blended into a composite score under configurable weights.
//! Raw component scores are kept on each record so consumers can audit how
//! a composite came about.

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use rustworkx_core::centrality::betweenness_centrality;
use std::sync::Arc;

use crate::config::{CentralityWeights, EngineConfig, PageRankConfig};

use super::models::{CentralityRecord, LiteratureGraph};

/// Nodes below the parallel threshold are scored serially by rustworkx-core.
const BETWEENNESS_PARALLEL_THRESHOLD: usize = 50;

/// One centrality signal. Scores are indexed by `NodeIndex` order and must
/// have one entry per node.
pub trait CentralityScorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, graph: &LiteratureGraph) -> Vec<f64>;
}

// ============================================================================
// Degree
// ============================================================================

/// Total degree (in + out) normalized by `n - 1`.
pub struct DegreeCentrality;

impl CentralityScorer for DegreeCentrality {
    fn name(&self) -> &'static str {
        "degree"
    }

    fn score(&self, graph: &LiteratureGraph) -> Vec<f64> {
        let g = &graph.graph;
        let n = g.node_count();
        if n < 2 {
            return vec![0.0; n];
        }
        let denom = (n - 1) as f64;
        g.node_indices()
            .map(|idx| {
                let degree = g.neighbors_directed(idx, Direction::Outgoing).count()
                    + g.neighbors_directed(idx, Direction::Incoming).count();
                degree as f64 / denom
            })
            .collect()
    }
}

// ============================================================================
// Betweenness
// ============================================================================

/// Shortest-path betweenness, endpoint-exclusive and normalized.
pub struct BetweennessCentrality;

impl CentralityScorer for BetweennessCentrality {
    fn name(&self) -> &'static str {
        "betweenness"
    }

    fn score(&self, graph: &LiteratureGraph) -> Vec<f64> {
        betweenness_centrality(&graph.graph, false, true, BETWEENNESS_PARALLEL_THRESHOLD)
            .into_iter()
            .map(|s| s.unwrap_or(0.0))
            .collect()
    }
}

// ============================================================================
// PageRank
// ============================================================================

/// Power-iteration PageRank with uniform dangling-mass redistribution.
pub struct PageRankCentrality {
    pub config: PageRankConfig,
}

impl PageRankCentrality {
    pub fn new(config: PageRankConfig) -> Self {
        Self { config }
    }
}

impl Default for PageRankCentrality {
    fn default() -> Self {
        Self::new(PageRankConfig::default())
    }
}

impl CentralityScorer for PageRankCentrality {
    fn name(&self) -> &'static str {
        "pagerank"
    }

    fn score(&self, graph: &LiteratureGraph) -> Vec<f64> {
        let g = &graph.graph;
        let n = g.node_count();
        if n == 0 {
            return Vec::new();
        }

        let damping = self.config.damping;
        let base = (1.0 - damping) / n as f64;
        let out_degree: Vec<usize> = g
            .node_indices()
            .map(|idx| g.neighbors_directed(idx, Direction::Outgoing).count())
            .collect();

        let mut ranks = vec![1.0 / n as f64; n];
        for _ in 0..self.config.max_iterations {
            // Dangling nodes spread their mass uniformly
            let dangling_mass: f64 = ranks
                .iter()
                .zip(&out_degree)
                .filter(|&(_, &d)| d == 0)
                .map(|(r, _)| r)
                .sum();
            let dangling_share = damping * dangling_mass / n as f64;

            let mut next = vec![base + dangling_share; n];
            for idx in g.node_indices() {
                let d = out_degree[idx.index()];
                if d == 0 {
                    continue;
                }
                let share = damping * ranks[idx.index()] / d as f64;
                for neighbor in g.neighbors_directed(idx, Direction::Outgoing) {
                    next[neighbor.index()] += share;
                }
            }

            let delta: f64 = next
                .iter()
                .zip(&ranks)
                .map(|(a, b)| (a - b).abs())
                .sum();
            ranks = next;
            if delta < self.config.tolerance {
                break;
            }
        }
        ranks
    }
}

// ============================================================================
// Composite ranking
// ============================================================================

/// The scorer set the engine blends. Slots are injectable for tests.
#[derive(Clone)]
pub struct CentralityScorers {
    pub degree: Arc<dyn CentralityScorer>,
    pub betweenness: Arc<dyn CentralityScorer>,
    pub pagerank: Arc<dyn CentralityScorer>,
}

impl Default for CentralityScorers {
    fn default() -> Self {
        Self {
            degree: Arc::new(DegreeCentrality),
            betweenness: Arc::new(BetweennessCentrality),
            pagerank: Arc::new(PageRankCentrality::default()),
        }
    }
}

impl CentralityScorers {
    pub fn with_pagerank_config(config: PageRankConfig) -> Self {
        Self {
            pagerank: Arc::new(PageRankCentrality::new(config)),
            ..Self::default()
        }
    }
}

/// Rank all nodes by composite centrality and keep the configured top N.
///
/// Graphs with fewer than 2 nodes have no meaningful ranking and yield an
/// empty list. Records carry the raw (pre-normalization) component scores;
/// only the composite uses the min-max normalized values.
pub fn rank_centrality(
    graph: &LiteratureGraph,
    config: &EngineConfig,
    scorers: &CentralityScorers,
) -> Vec<CentralityRecord> {
    let n = graph.node_count();
    if n < 2 {
        return Vec::new();
    }

    let degree = scorers.degree.score(graph);
    let betweenness = scorers.betweenness.score(graph);
    let pagerank = scorers.pagerank.score(graph);

    let norm_degree = min_max_normalize(&degree);
    let norm_betweenness = min_max_normalize(&betweenness);
    let norm_pagerank = min_max_normalize(&pagerank);

    let weights = normalized_weights(&config.centrality_weights);

    let mut records: Vec<CentralityRecord> = graph
        .graph
        .node_indices()
        .map(|idx| {
            let i = idx.index();
            CentralityRecord {
                id: graph.graph[idx].id.clone(),
                composite: weights.degree * norm_degree[i]
                    + weights.betweenness * norm_betweenness[i]
                    + weights.pagerank * norm_pagerank[i],
                degree: degree[i],
                betweenness: betweenness[i],
                pagerank: pagerank[i],
            }
        })
        .collect();

    records.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    records.truncate(config.centrality_top_n);
    records
}

/// Min-max scale to [0, 1]; a zero range maps every score to 0.
fn min_max_normalize(scores: &[f64]) -> Vec<f64> {
    let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range == 0.0 {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|&s| (s - min) / range).collect()
}

fn normalized_weights(weights: &CentralityWeights) -> CentralityWeights {
    let sum = weights.degree + weights.betweenness + weights.pagerank;
    CentralityWeights {
        degree: weights.degree / sum,
        betweenness: weights.betweenness / sum,
        pagerank: weights.pagerank / sum,
    }
}
