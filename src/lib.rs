//! litgraph
//!
//! A literature relationship graph engine:
//! - Citation and textual-similarity edges over a document corpus (petgraph)
//! - Structural statistics, community detection, centrality ranking, and
//!   research evolution paths
//! - A flat export view for visualization and API consumers
//!
//! Entry point: [`LiteratureGraphEngine`] behind the [`RelationEngine`]
//! trait.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod graph;
pub mod similarity;

pub use config::{CentralityWeights, EngineConfig, PageRankConfig};
pub use document::Document;
pub use engine::{LiteratureGraphEngine, RelationEngine};
pub use error::{EngineError, Result};
pub use graph::models::{
    CentralityRecord, Cluster, ClusterStrategy, EdgeKind, EvolutionPath, ExportedEdge,
    ExportedNode, GraphStats, LiteratureAnalysis, LiteratureGraph, PaperNode, PathStep,
    RelationEdge,
};
