//! Research evolution paths.
//!
//! Finds directed paths from documents in the corpus's earliest publication
//! year to documents in its latest year. Endpoint candidates are sampled
//! deterministically (ascending node id) and each candidate pair is resolved
//! with a BFS shortest path, so identical input always yields identical
//! paths.

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};

use crate::config::EngineConfig;

use super::models::{EvolutionPath, LiteratureGraph, PathStep};

/// Trace evolution paths between the earliest and latest publication years.
///
/// Documents without a known year never participate. Fewer than two
/// distinct years means there is no temporal span to trace and the result
/// is empty.
pub fn trace_evolution(graph: &LiteratureGraph, config: &EngineConfig) -> Vec<EvolutionPath> {
    let mut by_year: HashMap<i32, Vec<NodeIndex>> = HashMap::new();
    for idx in graph.graph.node_indices() {
        if let Some(year) = graph.graph[idx].year {
            by_year.entry(year).or_default().push(idx);
        }
    }
    if by_year.len() < 2 {
        return Vec::new();
    }

    let start_year = *by_year.keys().min().unwrap_or(&0);
    let end_year = *by_year.keys().max().unwrap_or(&0);

    let sources = sample_endpoints(graph, &by_year[&start_year], config.path_endpoint_sample);
    let targets = sample_endpoints(graph, &by_year[&end_year], config.path_endpoint_sample);

    let mut paths = Vec::new();
    'outer: for &source in &sources {
        for &target in &targets {
            if let Some(steps) = shortest_path(graph, source, target) {
                paths.push(EvolutionPath {
                    length: steps.len(),
                    steps,
                    start_year,
                    end_year,
                });
                if paths.len() >= config.max_paths {
                    break 'outer;
                }
            }
        }
    }
    paths
}

/// Up to `sample` endpoint candidates in ascending-id order.
fn sample_endpoints(
    graph: &LiteratureGraph,
    candidates: &[NodeIndex],
    sample: usize,
) -> Vec<NodeIndex> {
    let mut sorted: Vec<NodeIndex> = candidates.to_vec();
    sorted.sort_by(|a, b| graph.graph[*a].id.cmp(&graph.graph[*b].id));
    sorted.truncate(sample);
    sorted
}

/// BFS shortest path following outgoing edges, as a step list including
/// both endpoints.
fn shortest_path(
    graph: &LiteratureGraph,
    source: NodeIndex,
    target: NodeIndex,
) -> Option<Vec<PathStep>> {
    if source == target {
        return None;
    }
    let g = &graph.graph;
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(source);
    parent.insert(source, source);

    while let Some(current) = queue.pop_front() {
        if current == target {
            break;
        }
        for neighbor in g.neighbors_directed(current, Direction::Outgoing) {
            if !parent.contains_key(&neighbor) {
                parent.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }
    }

    if !parent.contains_key(&target) {
        return None;
    }

    let mut indices = vec![target];
    let mut current = target;
    while current != source {
        current = parent[&current];
        indices.push(current);
    }
    indices.reverse();

    Some(
        indices
            .into_iter()
            .map(|idx| PathStep {
                id: g[idx].id.clone(),
                year: g[idx].year,
            })
            .collect(),
    )
}
