//! Graph data models.
//!
//! ## Graph structure
//! - [`PaperNode`] / [`RelationEdge`] / [`EdgeKind`] — literature graph elements
//! - [`LiteratureGraph`] — petgraph wrapper with ID ↔ NodeIndex mapping
//!
//! ## Analysis outputs
//! - [`GraphStats`] — aggregate structural metrics
//! - [`Cluster`] — thematic community in the report view
//! - [`CentralityRecord`] — composite importance score with raw components
//! - [`EvolutionPath`] / [`PathStep`] — early-to-late research paths
//! - [`ExportedNode`] / [`ExportedEdge`] — flat transport view
//! - [`LiteratureAnalysis`] — aggregated result of a full engine run

use chrono::{DateTime, Utc};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Graph structure
// ============================================================================

/// Kind of relationship between two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Directed: citing document → cited document
    Citation,
    /// Symmetric textual relatedness, stored once per unordered pair with
    /// the lexicographically smaller node id as source. Consumers must
    /// treat these edges as logically undirected.
    Similarity,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Citation => write!(f, "citation"),
            Self::Similarity => write!(f, "similarity"),
        }
    }
}

/// A relationship between two documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationEdge {
    pub kind: EdgeKind,
    /// 1.0 for citations; the similarity score for similarity edges
    pub weight: f64,
}

impl RelationEdge {
    pub fn citation() -> Self {
        Self {
            kind: EdgeKind::Citation,
            weight: 1.0,
        }
    }

    pub fn similarity(score: f64) -> Self {
        Self {
            kind: EdgeKind::Similarity,
            weight: score,
        }
    }
}

/// A document inside the graph: the run-wide identity plus the denormalized
/// fields downstream consumers display without re-fetching the `Document`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperNode {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub citation_count: u32,
    pub quality_score: f64,
    pub source: String,
}

/// Wrapper around `petgraph::DiGraph` with bidirectional ID ↔ NodeIndex
/// mapping. Node ids are the uniqueness key for the whole engine run:
/// re-adding an id is a no-op, and self-loops are rejected.
#[derive(Debug, Clone, Default)]
pub struct LiteratureGraph {
    pub graph: DiGraph<PaperNode, RelationEdge>,
    pub id_to_index: HashMap<String, NodeIndex>,
}

impl LiteratureGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            id_to_index: HashMap::with_capacity(nodes),
        }
    }

    /// Add a node, returning its index. An existing id returns the existing
    /// index unchanged.
    pub fn add_node(&mut self, node: PaperNode) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.id_to_index.insert(id, idx);
        idx
    }

    /// Add an edge between two node ids. Returns `None` when either
    /// endpoint is missing or the edge would be a self-loop.
    pub fn add_edge(
        &mut self,
        from_id: &str,
        to_id: &str,
        edge: RelationEdge,
    ) -> Option<petgraph::graph::EdgeIndex> {
        if from_id == to_id {
            return None;
        }
        let from_idx = *self.id_to_index.get(from_id)?;
        let to_idx = *self.id_to_index.get(to_id)?;
        Some(self.graph.add_edge(from_idx, to_idx, edge))
    }

    pub fn get_node(&self, id: &str) -> Option<&PaperNode> {
        let idx = self.id_to_index.get(id)?;
        self.graph.node_weight(*idx)
    }

    pub fn get_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

// ============================================================================
// Analysis outputs
// ============================================================================

/// Aggregate structural metrics over the built graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Directed density `e / (n·(n-1))`; 0 when n < 2
    pub density: f64,
    /// Mean total degree (in + out)
    pub avg_degree: f64,
    /// Max total degree
    pub max_degree: usize,
    /// Undirected connected components
    pub component_count: usize,
}

/// Which strategy produced the cluster partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStrategy {
    /// Modularity-optimizing detection (primary)
    Modularity,
    /// Undirected connected components (explicit fallback)
    ConnectedComponents,
}

/// A thematic cluster in the report view. `size` is the true member count;
/// `members` is capped to the configured report limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: u32,
    pub size: usize,
    pub members: Vec<String>,
    /// Top-weighted terms of the cluster's texts, or "unknown theme"
    pub label: String,
}

/// Composite importance score for one node, with the raw component scores
/// kept for auditability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentralityRecord {
    pub id: String,
    pub composite: f64,
    pub degree: f64,
    pub betweenness: f64,
    pub pagerank: f64,
}

/// One node on an evolution path, annotated with its year for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathStep {
    pub id: String,
    pub year: Option<i32>,
}

/// A directed path from a node in the corpus's earliest year to a node in
/// its latest year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionPath {
    pub steps: Vec<PathStep>,
    pub length: usize,
    pub start_year: i32,
    pub end_year: i32,
}

/// Flat node entry for external visualization or API consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedNode {
    pub id: String,
    /// Truncated display label derived from the title
    pub label: String,
    pub year: Option<i32>,
    pub quality_score: f64,
    pub citation_count: u32,
}

/// Flat edge entry for external consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub weight: f64,
}

/// Complete result of one engine invocation, the sole hand-off contract
/// toward report/visualization consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteratureAnalysis {
    pub node_count: usize,
    pub edge_count: usize,
    pub stats: GraphStats,
    pub clusters: Vec<Cluster>,
    pub cluster_strategy: ClusterStrategy,
    pub centrality: Vec<CentralityRecord>,
    pub evolution_paths: Vec<EvolutionPath>,
    pub nodes: Vec<ExportedNode>,
    pub edges: Vec<ExportedEdge>,
    /// True when similarity computation was cancelled mid-run; the edge set
    /// then contains only the pairs aggregated before cancellation.
    pub partial: bool,
    pub computed_at: DateTime<Utc>,
}

// ============================================================================
// Tests
// ============================================================================
