//! Literature relationship graph.
//!
//! Builds a directed graph over a document corpus (citation and textual
//! similarity edges on petgraph) and runs the analysis suite: structural
//! statistics, community detection, centrality ranking, evolution paths,
//! and a flat export view.
//!
//! ## Architecture
//!
//! ```text
//! Vec<Document> ──► builder ──► LiteratureGraph (petgraph::DiGraph)
//!                                      │
//!              ┌───────────┬───────────┼───────────┬───────────┐
//!            stats     community   centrality  evolution    export
//!              └───────────┴───────────┼───────────┴───────────┘
//!                                      │
//!                             LiteratureAnalysis
//! ```
//!
//! ## Modules
//!
//! - [`models`] — Data structures (PaperNode, RelationEdge, LiteratureGraph, analysis outputs)
//! - [`builder`] — Document retention and node/edge assembly
//! - [`stats`] — Density, degree aggregates, component count
//! - [`community`] — Modularity clustering with a connected-components fallback
//! - [`centrality`] — Degree/betweenness/PageRank composite ranking
//! - [`evolution`] — Early-to-late directed research paths
//! - [`export`] — Flat node/edge lists for external consumers

pub mod builder;
pub mod centrality;
pub mod community;
pub mod evolution;
pub mod export;
pub mod models;
pub mod stats;

// Re-export primary types for convenience
pub use builder::{BuiltGraph, GraphBuilder};
pub use centrality::{CentralityScorer, CentralityScorers};
pub use community::{CommunityDetector, ComponentDetector, ModularityDetector};
pub use models::{
    CentralityRecord, Cluster, ClusterStrategy, EdgeKind, EvolutionPath, ExportedEdge,
    ExportedNode, GraphStats, LiteratureAnalysis, LiteratureGraph, PaperNode, PathStep,
    RelationEdge,
};
