//! Flat graph export for external consumers.

use petgraph::visit::EdgeRef;

use super::models::{ExportedEdge, ExportedNode, LiteratureGraph};

/// Display labels are truncated to this many characters.
const LABEL_MAX_CHARS: usize = 60;

/// Flatten the graph into node and edge lists in index order.
pub fn export_graph(graph: &LiteratureGraph) -> (Vec<ExportedNode>, Vec<ExportedEdge>) {
    let g = &graph.graph;

    let nodes = g
        .node_indices()
        .map(|idx| {
            let node = &g[idx];
            ExportedNode {
                id: node.id.clone(),
                label: node.title.chars().take(LABEL_MAX_CHARS).collect(),
                year: node.year,
                quality_score: node.quality_score,
                citation_count: node.citation_count,
            }
        })
        .collect();

    let edges = g
        .edge_references()
        .map(|edge| ExportedEdge {
            source: g[edge.source()].id.clone(),
            target: g[edge.target()].id.clone(),
            kind: edge.weight().kind,
            weight: edge.weight().weight,
        })
        .collect();

    (nodes, edges)
}
