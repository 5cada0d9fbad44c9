//! Relation engine — orchestrates the full pipeline.
//!
//! The `RelationEngine` trait is the single entry point for analysis
//! consumers. The concrete `LiteratureGraphEngine` encapsulates:
//!
//! 1. **Build**: document list → `LiteratureGraph` (retention, citation and
//!    similarity edges)
//! 2. **Analyze**: stats, clusters, centrality, and evolution paths, run
//!    concurrently over the frozen graph
//! 3. **Export**: flat node/edge lists for external consumers
//!
//! Graph work is CPU-bound, so each phase runs on the blocking pool; the
//! four analyses share the immutable graph through an `Arc` and are joined
//! with `tokio::join!`.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::EngineConfig;
use crate::document::Document;
use crate::error::{EngineError, Result};
use crate::graph::builder::GraphBuilder;
use crate::graph::centrality::{rank_centrality, CentralityScorers};
use crate::graph::community::{
    detect_clusters, CommunityDetector, ComponentDetector, ModularityDetector,
};
use crate::graph::evolution::trace_evolution;
use crate::graph::export::export_graph;
use crate::graph::models::{LiteratureAnalysis, LiteratureGraph};
use crate::graph::stats::compute_stats;

// ============================================================================
// Trait
// ============================================================================

/// Analysis engine trait — single entry point for relationship analysis.
///
/// Consumers use `Arc<dyn RelationEngine>` for dependency injection.
#[async_trait]
pub trait RelationEngine: Send + Sync {
    /// Run the full pipeline without external cancellation.
    async fn analyze(&self, documents: Vec<Document>) -> Result<LiteratureAnalysis> {
        self.analyze_with_cancel(documents, CancellationToken::new())
            .await
    }

    /// Run the full pipeline. Cancelling the token cuts the similarity scan
    /// short; the result is then flagged `partial` instead of failing.
    async fn analyze_with_cancel(
        &self,
        documents: Vec<Document>,
        cancel: CancellationToken,
    ) -> Result<LiteratureAnalysis>;
}

// ============================================================================
// Concrete implementation
// ============================================================================

/// Real engine: build → concurrent analyses → export.
///
/// Detectors and scorers are injectable; defaults are the modularity
/// detector with a connected-components fallback, and the
/// degree/betweenness/PageRank scorer set.
pub struct LiteratureGraphEngine {
    config: Arc<EngineConfig>,
    detectors: Vec<Arc<dyn CommunityDetector>>,
    scorers: CentralityScorers,
}

impl std::fmt::Debug for LiteratureGraphEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiteratureGraphEngine")
            .field("config", &self.config)
            .field(
                "detectors",
                &self.detectors.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl LiteratureGraphEngine {
    /// Create an engine, validating the configuration eagerly so a bad
    /// config fails at construction rather than mid-analysis.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let scorers = CentralityScorers::with_pagerank_config(config.pagerank);
        Ok(Self {
            config: Arc::new(config),
            detectors: vec![
                Arc::new(ModularityDetector::default()),
                Arc::new(ComponentDetector),
            ],
            scorers,
        })
    }

    /// Replace the detector chain. Detectors are tried in order; the first
    /// success wins.
    pub fn with_detectors(mut self, detectors: Vec<Arc<dyn CommunityDetector>>) -> Self {
        self.detectors = detectors;
        self
    }

    pub fn with_scorers(mut self, scorers: CentralityScorers) -> Self {
        self.scorers = scorers;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[async_trait]
impl RelationEngine for LiteratureGraphEngine {
    async fn analyze_with_cancel(
        &self,
        documents: Vec<Document>,
        cancel: CancellationToken,
    ) -> Result<LiteratureAnalysis> {
        debug!(documents = documents.len(), "starting literature analysis");

        // Cluster labels need the similarity text of every document that
        // could end up in the graph; capture it before the build consumes
        // the list.
        let texts: HashMap<String, String> = documents
            .iter()
            .map(|d| (d.node_id(), d.text()))
            .collect();

        // 1. Build (blocking pool: tokenization and the O(n²) scan)
        let build_config = Arc::clone(&self.config);
        let build_cancel = cancel.clone();
        let built = tokio::task::spawn_blocking(move || {
            GraphBuilder::new(&build_config).build(&documents, &build_cancel)
        })
        .await
        .map_err(|e| EngineError::Internal(e.to_string()))?;

        let graph: Arc<LiteratureGraph> = Arc::new(built.graph);
        let partial = built.partial;

        // 2. Analyze: four independent passes over the frozen graph
        let stats_graph = Arc::clone(&graph);
        let stats_task = tokio::task::spawn_blocking(move || compute_stats(&stats_graph));

        let cluster_graph = Arc::clone(&graph);
        let cluster_config = Arc::clone(&self.config);
        let detectors = self.detectors.clone();
        let cluster_task = tokio::task::spawn_blocking(move || {
            detect_clusters(&cluster_graph, &cluster_config, &texts, &detectors)
        });

        let centrality_graph = Arc::clone(&graph);
        let centrality_config = Arc::clone(&self.config);
        let scorers = self.scorers.clone();
        let centrality_task = tokio::task::spawn_blocking(move || {
            rank_centrality(&centrality_graph, &centrality_config, &scorers)
        });

        let evolution_graph = Arc::clone(&graph);
        let evolution_config = Arc::clone(&self.config);
        let evolution_task = tokio::task::spawn_blocking(move || {
            trace_evolution(&evolution_graph, &evolution_config)
        });

        let (stats, clusters, centrality, evolution_paths) =
            tokio::join!(stats_task, cluster_task, centrality_task, evolution_task);
        let stats = stats.map_err(|e| EngineError::Internal(e.to_string()))?;
        let (clusters, cluster_strategy) =
            clusters.map_err(|e| EngineError::Internal(e.to_string()))?;
        let centrality = centrality.map_err(|e| EngineError::Internal(e.to_string()))?;
        let evolution_paths = evolution_paths.map_err(|e| EngineError::Internal(e.to_string()))?;

        // 3. Export (linear in graph size, cheap enough inline)
        let (nodes, edges) = export_graph(&graph);

        Ok(LiteratureAnalysis {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            stats,
            clusters,
            cluster_strategy,
            centrality,
            evolution_paths,
            nodes,
            edges,
            partial,
            computed_at: Utc::now(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::models::ClusterStrategy;

    fn doc(id: &str, year: i32, quality: f64, abstract_text: &str) -> Document {
        Document {
            id: Some(id.to_string()),
            title: format!("Paper {}", id),
            authors: vec![],
            year: Some(year),
            abstract_text: Some(abstract_text.to_string()),
            citation_count: 0,
            quality_score: quality,
            source: "test".to_string(),
            references: vec![],
        }
    }

    #[tokio::test]
    async fn test_analyze_empty_corpus() {
        let engine = LiteratureGraphEngine::new(EngineConfig::default()).unwrap();
        let result = engine.analyze(vec![]).await.unwrap();

        assert_eq!(result.node_count, 0);
        assert_eq!(result.edge_count, 0);
        assert!(result.clusters.is_empty());
        assert!(result.centrality.is_empty());
        assert!(result.evolution_paths.is_empty());
        assert!(result.nodes.is_empty());
        assert!(!result.partial);
    }

    #[tokio::test]
    async fn test_analyze_small_corpus() {
        let mut cites = doc("b", 2015, 70.0, "graph neural network message passing");
        cites.references = vec!["a".to_string()];
        let documents = vec![
            doc("a", 2010, 90.0, "graph neural network foundations"),
            cites,
            doc("c", 2020, 60.0, "protein folding molecular dynamics"),
        ];

        let engine = LiteratureGraphEngine::new(EngineConfig::default()).unwrap();
        let result = engine.analyze(documents).await.unwrap();

        assert_eq!(result.node_count, 3);
        // At least the citation edge b → a
        assert!(result.edge_count >= 1);
        assert!(result
            .edges
            .iter()
            .any(|e| e.source == "b" && e.target == "a"));
        assert_eq!(result.cluster_strategy, ClusterStrategy::Modularity);
        assert_eq!(result.centrality.len(), 3);
        assert!(!result.partial);

        // Clusters partition the node set
        let total: usize = result.clusters.iter().map(|c| c.size).sum();
        assert_eq!(total, 3);

        let now = Utc::now();
        assert!((now - result.computed_at).num_seconds() < 5);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_at_construction() {
        let mut config = EngineConfig::default();
        config.similarity_threshold = 1.5;
        let err = LiteratureGraphEngine::new(config).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_run_flagged_partial() {
        let documents: Vec<Document> = (0..32)
            .map(|i| {
                doc(
                    &format!("p{}", i),
                    2015,
                    50.0,
                    "shared vocabulary appears in every abstract here",
                )
            })
            .collect();

        let mut config = EngineConfig::default();
        config.similarity_block_size = 8;
        let engine = LiteratureGraphEngine::new(config).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let result = engine
            .analyze_with_cancel(documents, token)
            .await
            .unwrap();

        assert!(result.partial);
        assert_eq!(result.node_count, 32);
    }

    #[tokio::test]
    async fn test_engine_as_trait_object() {
        let engine: Arc<dyn RelationEngine> =
            Arc::new(LiteratureGraphEngine::new(EngineConfig::default()).unwrap());
        let result = engine
            .analyze(vec![doc("only", 2020, 80.0, "solo document")])
            .await
            .unwrap();
        assert_eq!(result.node_count, 1);
        // A single node has no ranking and no temporal span
        assert!(result.centrality.is_empty());
        assert!(result.evolution_paths.is_empty());
    }
}
