//! End-to-end engine tests: document list in, full analysis out.

use std::sync::Arc;

use litgraph::{
    Document, EdgeKind, EngineConfig, LiteratureAnalysis, LiteratureGraphEngine, RelationEngine,
};
use tokio_util::sync::CancellationToken;

fn doc(id: &str, year: i32, quality: f64) -> Document {
    Document {
        id: Some(id.to_string()),
        title: format!("Untitled {}", id),
        authors: vec![],
        year: Some(year),
        abstract_text: None,
        citation_count: 0,
        quality_score: quality,
        source: "test".to_string(),
        references: vec![],
    }
}

fn engine(config: EngineConfig) -> LiteratureGraphEngine {
    LiteratureGraphEngine::new(config).unwrap()
}

/// Four documents: a foundational paper, a follow-up citing it, a near
/// duplicate of the follow-up, and an unrelated outlier.
fn survey_corpus() -> Vec<Document> {
    let mut a = doc("a", 2010, 90.0);
    a.title = "Convex optimization for portfolio selection".to_string();
    a.abstract_text =
        Some("convex optimization duality interior point portfolio selection".to_string());

    let mut b = doc("b", 2012, 70.0);
    b.title = "Graph embeddings for recommendation".to_string();
    b.abstract_text =
        Some("graph embeddings random walks recommendation ranking collaborative".to_string());
    b.references = vec!["a".to_string()];

    let mut c = doc("c", 2015, 60.0);
    c.title = "Scalable graph embeddings for recommendation".to_string();
    c.abstract_text =
        Some("graph embeddings random walks recommendation ranking scalable".to_string());

    let mut d = doc("d", 2020, 95.0);
    d.title = "Soil microbiome diversity surveys".to_string();
    d.abstract_text = Some("soil microbiome bacterial diversity sequencing".to_string());

    vec![a, b, c, d]
}

#[tokio::test]
async fn test_empty_corpus_yields_empty_analysis() {
    let result = engine(EngineConfig::default()).analyze(vec![]).await.unwrap();

    assert_eq!(result.node_count, 0);
    assert_eq!(result.edge_count, 0);
    assert_eq!(result.stats.component_count, 0);
    assert!(result.clusters.is_empty());
    assert!(result.centrality.is_empty());
    assert!(result.evolution_paths.is_empty());
    assert!(result.nodes.is_empty());
    assert!(result.edges.is_empty());
    assert!(!result.partial);
}

#[tokio::test]
async fn test_survey_corpus_end_to_end() {
    let result = engine(EngineConfig::default())
        .analyze(survey_corpus())
        .await
        .unwrap();

    assert_eq!(result.node_count, 4);

    // The citation b → a
    assert!(result
        .edges
        .iter()
        .any(|e| e.kind == EdgeKind::Citation && e.source == "b" && e.target == "a"));

    // The near-duplicate pair b/c as one similarity edge, smaller id first
    let similarity: Vec<_> = result
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Similarity)
        .collect();
    assert!(similarity
        .iter()
        .any(|e| e.source == "b" && e.target == "c" && e.weight >= 0.3));

    // b and c share a cluster
    let cluster_of = |id: &str| {
        result
            .clusters
            .iter()
            .position(|c| c.members.iter().any(|m| m == id))
            .unwrap()
    };
    assert_eq!(cluster_of("b"), cluster_of("c"));

    // Earliest-year paper "a" has no outgoing edges, so no evolution path
    // can reach 2020
    assert!(result.evolution_paths.is_empty());

    // Every node appears in the export and in exactly one cluster
    assert_eq!(result.nodes.len(), 4);
    let total: usize = result.clusters.iter().map(|c| c.size).sum();
    assert_eq!(total, 4);
}

#[tokio::test]
async fn test_retention_is_deterministic_across_runs() {
    // Equal quality scores force the id tie-break
    let documents: Vec<Document> = ["delta", "alpha", "echo", "bravo", "charlie"]
        .iter()
        .map(|id| doc(id, 2015, 80.0))
        .collect();

    let mut config = EngineConfig::default();
    config.max_nodes = Some(3);

    let first = engine(config.clone()).analyze(documents.clone()).await.unwrap();
    let second = engine(config).analyze(documents).await.unwrap();

    let ids = |r: &LiteratureAnalysis| {
        let mut v: Vec<String> = r.nodes.iter().map(|n| n.id.clone()).collect();
        v.sort_unstable();
        v
    };
    assert_eq!(ids(&first), vec!["alpha", "bravo", "charlie"]);
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn test_self_citations_never_become_edges() {
    let mut selfish = doc("a", 2015, 80.0);
    selfish.references = vec!["a".to_string()];

    let result = engine(EngineConfig::default())
        .analyze(vec![selfish, doc("b", 2016, 70.0)])
        .await
        .unwrap();

    assert!(result.edges.iter().all(|e| e.source != e.target));
    assert_eq!(result.edge_count, 0);
}

#[tokio::test]
async fn test_higher_threshold_keeps_subset_of_edges() {
    let documents = survey_corpus();

    let mut low = EngineConfig::default();
    low.similarity_threshold = 0.1;
    low.include_citations = false;
    let mut high = low.clone();
    high.similarity_threshold = 0.6;

    let low_result = engine(low).analyze(documents.clone()).await.unwrap();
    let high_result = engine(high).analyze(documents).await.unwrap();

    for edge in &high_result.edges {
        assert!(
            low_result
                .edges
                .iter()
                .any(|e| e.source == edge.source && e.target == edge.target),
            "edge {} → {} present at 0.6 but missing at 0.1",
            edge.source,
            edge.target
        );
    }
    assert!(high_result.edge_count <= low_result.edge_count);
}

#[tokio::test]
async fn test_centrality_top_n_capped_and_sorted() {
    let mut config = EngineConfig::default();
    config.centrality_top_n = 2;
    let result = engine(config).analyze(survey_corpus()).await.unwrap();

    assert_eq!(result.centrality.len(), 2);
    assert!(result.centrality[0].composite >= result.centrality[1].composite);

    // Fewer nodes than the cap: all of them
    let mut config = EngineConfig::default();
    config.centrality_top_n = 10;
    let result = engine(config).analyze(survey_corpus()).await.unwrap();
    assert_eq!(result.centrality.len(), 4);
}

#[tokio::test]
async fn test_single_year_corpus_has_no_evolution() {
    let documents = vec![doc("a", 2020, 90.0), doc("b", 2020, 80.0)];
    let result = engine(EngineConfig::default()).analyze(documents).await.unwrap();
    assert!(result.evolution_paths.is_empty());
}

#[tokio::test]
async fn test_citation_chain_produces_evolution_path() {
    // Forward references give the early → late direction a path needs
    let mut early = doc("early", 2010, 90.0);
    early.references = vec!["mid".to_string()];
    let mut mid = doc("mid", 2015, 80.0);
    mid.references = vec!["late".to_string()];
    let late = doc("late", 2020, 70.0);
    let documents = vec![early, mid, late];

    let mut config = EngineConfig::default();
    config.include_similarity = false;
    let result = engine(config).analyze(documents).await.unwrap();

    assert_eq!(result.evolution_paths.len(), 1);
    let path = &result.evolution_paths[0];
    assert_eq!(path.start_year, 2010);
    assert_eq!(path.end_year, 2020);
    let ids: Vec<&str> = path.steps.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "mid", "late"]);
}

#[tokio::test]
async fn test_pre_cancelled_run_is_partial_with_fewer_edges() {
    let documents: Vec<Document> = (0..24)
        .map(|i| {
            let mut d = doc(&format!("p{:02}", i), 2015, 50.0);
            d.abstract_text =
                Some("common research vocabulary shared across the corpus".to_string());
            d
        })
        .collect();

    let mut config = EngineConfig::default();
    config.similarity_block_size = 4;

    let full = engine(config.clone()).analyze(documents.clone()).await.unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let cancelled = engine(config)
        .analyze_with_cancel(documents, token)
        .await
        .unwrap();

    assert!(!full.partial);
    assert!(cancelled.partial);
    assert_eq!(cancelled.node_count, 24);
    assert!(cancelled.edge_count <= full.edge_count);
}

#[tokio::test]
async fn test_analysis_survives_json_roundtrip() {
    let result = engine(EngineConfig::default())
        .analyze(survey_corpus())
        .await
        .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let back: LiteratureAnalysis = serde_json::from_str(&json).unwrap();

    assert_eq!(back.node_count, result.node_count);
    assert_eq!(back.edge_count, result.edge_count);
    assert_eq!(back.clusters.len(), result.clusters.len());
    assert_eq!(back.cluster_strategy, result.cluster_strategy);
    assert_eq!(back.computed_at, result.computed_at);
}

#[tokio::test]
async fn test_untitled_documents_use_title_prefix_as_id() {
    let mut anonymous = doc("ignored", 2015, 80.0);
    anonymous.id = None;
    anonymous.title = "x".repeat(80);

    let result = engine(EngineConfig::default())
        .analyze(vec![anonymous])
        .await
        .unwrap();

    assert_eq!(result.node_count, 1);
    assert_eq!(result.nodes[0].id.chars().count(), 50);
}

#[tokio::test]
async fn test_engine_shared_as_trait_object() {
    let shared: Arc<dyn RelationEngine> = Arc::new(engine(EngineConfig::default()));
    let handles: Vec<_> = (0..3)
        .map(|_| {
            let engine = Arc::clone(&shared);
            tokio::spawn(async move { engine.analyze(survey_corpus()).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.node_count, 4);
    }
}
