//! Document list → literature graph assembly.
//!
//! Retention (the `max_nodes` cap) happens once, before any edge
//! construction, so every downstream component operates on a fixed,
//! already-bounded node set. Retention order is deterministic (descending
//! quality score, ascending node id on ties) so that downstream density and
//! cluster counts are reproducible for identical input.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::EngineConfig;
use crate::document::Document;
use crate::similarity;

use super::models::{LiteratureGraph, PaperNode, RelationEdge};

/// A built graph plus whether similarity computation was cut short.
#[derive(Debug)]
pub struct BuiltGraph {
    pub graph: LiteratureGraph,
    pub partial: bool,
}

/// Assembles nodes and citation/similarity edges from caller-owned
/// document records. Never mutates its input.
pub struct GraphBuilder<'a> {
    config: &'a EngineConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Build the graph. Dangling citation references (targets outside the
    /// retained set) are dropped silently; that is expected, not an error.
    pub fn build(&self, documents: &[Document], cancel: &CancellationToken) -> BuiltGraph {
        let retained = retain_documents(documents, self.config.max_nodes);

        let mut graph = LiteratureGraph::with_capacity(retained.len(), retained.len() * 2);
        for doc in &retained {
            graph.add_node(PaperNode {
                id: doc.node_id(),
                title: doc.title.clone(),
                year: doc.known_year(),
                citation_count: doc.citation_count,
                quality_score: doc.quality_score,
                source: doc.source.clone(),
            });
        }

        let mut citation_edges = 0usize;
        if self.config.include_citations {
            for doc in &retained {
                let citing = doc.node_id();
                for cited in &doc.references {
                    if graph.get_index(cited).is_some()
                        && graph.add_edge(&citing, cited, RelationEdge::citation()).is_some()
                    {
                        citation_edges += 1;
                    }
                }
            }
        }

        let mut partial = false;
        let mut similarity_edges = 0usize;
        if self.config.include_similarity {
            let texts: Vec<String> = retained.iter().map(|d| d.text()).collect();
            let outcome = similarity::pairwise_scores(
                &texts,
                self.config.similarity_threshold,
                self.config.similarity_block_size,
                cancel,
            );
            partial = outcome.partial;

            for pair in outcome.pairs {
                let (id_a, id_b) = (retained[pair.a].node_id(), retained[pair.b].node_id());
                // One edge per unordered pair, smaller id as source
                let (source, target) = if id_a <= id_b { (id_a, id_b) } else { (id_b, id_a) };
                if graph
                    .add_edge(&source, &target, RelationEdge::similarity(pair.score))
                    .is_some()
                {
                    similarity_edges += 1;
                }
            }
        }

        info!(
            nodes = graph.node_count(),
            citation_edges,
            similarity_edges,
            partial,
            "literature graph built"
        );
        BuiltGraph { graph, partial }
    }
}

/// Deterministic retention: all documents when under the cap, otherwise
/// exactly `cap` documents by descending quality with an ascending-id
/// tie-break.
pub(crate) fn retain_documents(documents: &[Document], cap: Option<usize>) -> Vec<&Document> {
    let mut docs: Vec<&Document> = documents.iter().collect();
    docs.sort_by(|a, b| {
        b.quality_score
            .partial_cmp(&a.quality_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.node_id().cmp(&b.node_id()))
    });
    if let Some(cap) = cap {
        docs.truncate(cap);
    }
    docs
}
