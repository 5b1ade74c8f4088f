//! Deterministic topological ordering of validated pipeline graphs.

use super::model::{Edge, Node};
use crate::errors::EngineError;
use std::collections::{HashMap, VecDeque};

/// Orders nodes so each runs only after all of its predecessors.
///
/// Kahn's algorithm. Zero-in-degree nodes are seeded in declaration
/// order and successors are visited in edge-declaration order, so the
/// result is stable across calls and independent of hashing.
///
/// Defined only for graphs that already passed acyclicity validation.
///
/// # Errors
///
/// Returns `EngineError::Internal` if the order does not cover every
/// node, which can only happen when acyclicity was not actually
/// guaranteed.
pub fn execution_order<'a>(nodes: &'a [Node], edges: &[Edge]) -> Result<Vec<&'a Node>, EngineError> {
    let index: HashMap<_, _> = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

    let mut in_degree = vec![0usize; nodes.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for edge in edges {
        if let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.target)) {
            successors[s].push(t);
            in_degree[t] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order: Vec<&Node> = Vec::with_capacity(nodes.len());

    while let Some(i) = queue.pop_front() {
        order.push(&nodes[i]);
        for &succ in &successors[i] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                queue.push_back(succ);
            }
        }
    }

    if order.len() != nodes.len() {
        return Err(EngineError::Internal(format!(
            "topological order covered {} of {} nodes; the graph was not acyclic",
            order.len(),
            nodes.len()
        )));
    }

    Ok(order)
}
