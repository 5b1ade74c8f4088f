//! Structural correctness checks for pipeline graphs.
//!
//! Pure functions over the submitted graph. Runs on every pipeline
//! create/update before persistence, and defensively again before
//! execution, since definitions may have been imported or migrated.

use super::model::{Edge, Node};
use crate::errors::ValidationError;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Validates a pipeline graph.
///
/// Checks, in order: at least one source node, at least one destination
/// node, every edge referencing existing node ids, and acyclicity.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate(nodes: &[Node], edges: &[Edge]) -> Result<(), ValidationError> {
    if !nodes.iter().any(|n| n.kind.is_source()) {
        return Err(ValidationError::MissingSource);
    }
    if !nodes.iter().any(|n| n.kind.is_destination()) {
        return Err(ValidationError::MissingDestination);
    }

    let ids: HashSet<Uuid> = nodes.iter().map(|n| n.id).collect();
    for edge in edges {
        for node in [edge.source, edge.target] {
            if !ids.contains(&node) {
                return Err(ValidationError::DanglingEdge {
                    edge: edge.id,
                    node,
                });
            }
        }
    }

    detect_cycle(nodes, edges)
}

/// Depth-first traversal tracking a recursion stack; revisiting a node
/// currently on the stack is a cycle. The error carries the node names
/// along the cycle.
fn detect_cycle(nodes: &[Node], edges: &[Edge]) -> Result<(), ValidationError> {
    let mut successors: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for edge in edges {
        successors.entry(edge.source).or_default().push(edge.target);
    }
    let names: HashMap<Uuid, &str> = nodes.iter().map(|n| (n.id, n.name.as_str())).collect();

    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut in_stack: HashSet<Uuid> = HashSet::new();
    let mut path: Vec<Uuid> = Vec::new();

    fn dfs(
        node: Uuid,
        successors: &HashMap<Uuid, Vec<Uuid>>,
        visited: &mut HashSet<Uuid>,
        in_stack: &mut HashSet<Uuid>,
        path: &mut Vec<Uuid>,
    ) -> Result<(), Vec<Uuid>> {
        if in_stack.contains(&node) {
            let start = path.iter().position(|n| *n == node).unwrap_or(0);
            let mut cycle: Vec<Uuid> = path[start..].to_vec();
            cycle.push(node);
            return Err(cycle);
        }
        if visited.contains(&node) {
            return Ok(());
        }

        visited.insert(node);
        in_stack.insert(node);
        path.push(node);

        if let Some(next) = successors.get(&node) {
            for &succ in next {
                dfs(succ, successors, visited, in_stack, path)?;
            }
        }

        in_stack.remove(&node);
        path.pop();
        Ok(())
    }

    // Visit in declaration order for a deterministic cycle report.
    for node in nodes {
        dfs(node.id, &successors, &mut visited, &mut in_stack, &mut path).map_err(|cycle| {
            ValidationError::CycleDetected {
                path: cycle
                    .iter()
                    .map(|id| names.get(id).map_or_else(|| id.to_string(), ToString::to_string))
                    .collect(),
            }
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{
        DestinationConfig, DestinationKind, Edge, FilterConfig, Node, NodeKind, SourceConfig,
        SourceKind,
    };
    use serde_json::Value;

    fn source(name: &str) -> Node {
        Node::new(
            name,
            NodeKind::Source(SourceConfig {
                kind: SourceKind::Database,
                options: Value::Null,
            }),
        )
    }

    fn destination(name: &str) -> Node {
        Node::new(
            name,
            NodeKind::Destination(DestinationConfig {
                kind: DestinationKind::Warehouse,
                options: Value::Null,
            }),
        )
    }

    fn filter(name: &str) -> Node {
        Node::new(
            name,
            NodeKind::Filter(FilterConfig {
                conditions: Vec::new(),
            }),
        )
    }

    #[test]
    fn test_valid_linear_graph() {
        let src = source("src");
        let mid = filter("mid");
        let dst = destination("dst");
        let edges = vec![Edge::new(src.id, mid.id), Edge::new(mid.id, dst.id)];

        assert!(validate(&[src, mid, dst], &edges).is_ok());
    }

    #[test]
    fn test_missing_source() {
        let dst = destination("dst");
        let err = validate(&[dst], &[]).unwrap_err();
        assert_eq!(err, ValidationError::MissingSource);
    }

    #[test]
    fn test_missing_destination() {
        let src = source("src");
        let err = validate(&[src], &[]).unwrap_err();
        assert_eq!(err, ValidationError::MissingDestination);
    }

    #[test]
    fn test_dangling_edge() {
        let src = source("src");
        let dst = destination("dst");
        let ghost = uuid::Uuid::new_v4();
        let edge = Edge::new(src.id, ghost);
        let edge_id = edge.id;

        let err = validate(&[src, dst], &[edge]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DanglingEdge {
                edge: edge_id,
                node: ghost
            }
        );
    }

    #[test]
    fn test_cycle_detected() {
        let src = source("src");
        let a = filter("a");
        let b = filter("b");
        let dst = destination("dst");
        let edges = vec![
            Edge::new(src.id, a.id),
            Edge::new(a.id, b.id),
            Edge::new(b.id, a.id),
            Edge::new(b.id, dst.id),
        ];

        let err = validate(&[src, a, b, dst], &edges).unwrap_err();
        match err {
            ValidationError::CycleDetected { path } => {
                assert_eq!(path, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let src = source("src");
        let dst = destination("dst");
        let edges = vec![Edge::new(src.id, src.id), Edge::new(src.id, dst.id)];

        let err = validate(&[src, dst], &edges).unwrap_err();
        assert!(matches!(err, ValidationError::CycleDetected { .. }));
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let src = source("src");
        let a = filter("a");
        let b = filter("b");
        let dst = destination("dst");
        let edges = vec![
            Edge::new(src.id, a.id),
            Edge::new(src.id, b.id),
            Edge::new(a.id, dst.id),
            Edge::new(b.id, dst.id),
        ];

        assert!(validate(&[src, a, b, dst], &edges).is_ok());
    }
}
