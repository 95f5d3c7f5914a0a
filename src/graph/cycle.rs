//! Whole-graph cycle detection.
//!
//! Every gear is a start candidate, not only those reachable from the root:
//! a cycle anywhere in the submitted graph rejects the request.
//!
//! The depth-first search keeps its own stack of `(gear, next neighbor)`
//! frames, so graph depth is bounded by heap, not by the call stack.

use super::GearGraph;
use crate::model::GearId;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// The first cycle found, as a closed id path (`[0, 1, 2, 0]`).
pub fn find_cycle(graph: &GearGraph) -> Option<Vec<GearId>> {
    let mut marks = vec![Mark::Unvisited; graph.node_count()];
    let mut stack: Vec<(GearId, usize)> = Vec::new();

    for start in graph.ids() {
        if marks[start.index()] != Mark::Unvisited {
            continue;
        }
        marks[start.index()] = Mark::OnStack;
        stack.push((start, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            let neighbors = graph.neighbors(node);

            let Some(&next) = neighbors.get(cursor) else {
                marks[node.index()] = Mark::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match marks[next.index()] {
                Mark::OnStack => {
                    let from = stack.iter().position(|(id, _)| *id == next).unwrap_or(0);
                    let mut path: Vec<GearId> = stack[from..].iter().map(|(id, _)| *id).collect();
                    path.push(next);
                    return Some(path);
                }
                Mark::Unvisited => {
                    marks[next.index()] = Mark::OnStack;
                    stack.push((next, 0));
                }
                Mark::Done => {}
            }
        }
    }
    None
}

/// `StructuralError` naming the cycle, if the graph has one.
pub fn ensure_acyclic(graph: &GearGraph) -> Result<()> {
    match find_cycle(graph) {
        None => Ok(()),
        Some(path) => {
            let rendered: Vec<String> = path.iter().map(|id| id.to_string()).collect();
            Err(Error::StructuralError(format!("cycle detected: {}", rendered.join(" -> "))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GearNode, GearType};

    fn graph(n: u32, edges: &[(u32, u32)]) -> GearGraph {
        let mut g = GearGraph::default();
        for _ in 0..n {
            g.add_node(GearNode::new(GearId(0), GearType::Spur, 20));
        }
        for &(a, b) in edges {
            g.add_edge(GearId(a), GearId(b));
        }
        g
    }

    fn ids(raw: &[u32]) -> Vec<GearId> {
        raw.iter().copied().map(GearId).collect()
    }

    #[test]
    fn test_chain_is_acyclic() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(find_cycle(&g), None);
        assert!(ensure_acyclic(&g).is_ok());
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let g = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert_eq!(find_cycle(&g), None);
    }

    #[test]
    fn test_three_cycle() {
        let g = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(find_cycle(&g), Some(ids(&[0, 1, 2, 0])));
        let err = ensure_acyclic(&g).unwrap_err();
        assert_eq!(err.to_string(), "Structural error: cycle detected: 0 -> 1 -> 2 -> 0");
    }

    #[test]
    fn test_self_loop() {
        let g = graph(2, &[(0, 1), (1, 1)]);
        assert_eq!(find_cycle(&g), Some(ids(&[1, 1])));
    }

    #[test]
    fn test_unreachable_cycle_is_still_found() {
        // 0 -> 1, and 2 <-> 3 off on its own
        let g = graph(4, &[(0, 1), (2, 3), (3, 2)]);
        assert_eq!(find_cycle(&g), Some(ids(&[2, 3, 2])));
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let n = 200_000;
        let edges: Vec<(u32, u32)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        let g = graph(n, &edges);
        assert_eq!(find_cycle(&g), None);
    }
}
