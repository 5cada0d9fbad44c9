//! Aggregate structural metrics.
//!
//! Pure functions over the built graph; empty graphs yield all-zero
//! defaults, never errors.

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use std::collections::VecDeque;

use super::models::{GraphStats, LiteratureGraph};

/// Compute node/edge counts, directed density, degree aggregates, and the
/// undirected connected-component count.
pub fn compute_stats(graph: &LiteratureGraph) -> GraphStats {
    let g = &graph.graph;
    let n = g.node_count();
    let e = g.edge_count();

    let density = if n < 2 {
        0.0
    } else {
        e as f64 / (n as f64 * (n as f64 - 1.0))
    };

    let mut max_degree = 0usize;
    let mut degree_sum = 0usize;
    for idx in g.node_indices() {
        let degree = g.neighbors_directed(idx, Direction::Outgoing).count()
            + g.neighbors_directed(idx, Direction::Incoming).count();
        degree_sum += degree;
        max_degree = max_degree.max(degree);
    }
    let avg_degree = if n == 0 {
        0.0
    } else {
        degree_sum as f64 / n as f64
    };

    GraphStats {
        node_count: n,
        edge_count: e,
        density,
        avg_degree,
        max_degree,
        component_count: undirected_components(graph).len(),
    }
}

/// Connected components of the undirected projection, via BFS over both
/// edge directions. Each component's members are in ascending index order,
/// components ordered by their smallest member.
pub(crate) fn undirected_components(graph: &LiteratureGraph) -> Vec<Vec<NodeIndex>> {
    let g = &graph.graph;
    let n = g.node_count();
    let mut assigned: Vec<bool> = vec![false; n];
    let mut components: Vec<Vec<NodeIndex>> = Vec::new();

    for start in g.node_indices() {
        if assigned[start.index()] {
            continue;
        }
        let mut members = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        assigned[start.index()] = true;

        while let Some(current) = queue.pop_front() {
            members.push(current);
            for neighbor in g
                .neighbors_directed(current, Direction::Outgoing)
                .chain(g.neighbors_directed(current, Direction::Incoming))
            {
                if !assigned[neighbor.index()] {
                    assigned[neighbor.index()] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        members.sort_unstable();
        components.push(members);
    }

    components
}
