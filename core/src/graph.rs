//! The spatial network players move over.
//!
//! RULE: The graph is built once, before the engine, and is read-only
//! for the lifetime of a run. Nothing in the tick loop mutates it.
//!
//! Node ids are whatever the external graph builder assigned; they stay
//! stable for the run. Iteration orders are fixed so that a seeded run
//! replays exactly:
//!   - `nodes()` yields insertion order.
//!   - `transit_stops()` yields ascending id order.
//!   - `neighbors()` yields ascending id order.

use crate::{
    error::{SimError, SimResult},
    types::{NodeId, Point},
};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: NodeId,
    pub x:  f64,
    pub y:  f64,
}

impl NodeData {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub from:   NodeId,
    pub to:     NodeId,
    pub length: f64,
}

/// On-disk hand-off format of the external graph builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFile {
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
    #[serde(default)]
    pub transit_stops: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct SpatialGraph {
    pub(crate) graph: UnGraph<NodeData, f64>,
    pub(crate) index: HashMap<NodeId, NodeIndex>,
    order:            Vec<NodeId>,
    transit_stops:    BTreeSet<NodeId>,
}

impl SpatialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: NodeId, x: f64, y: f64) -> SimResult<()> {
        if self.index.contains_key(&id) {
            return Err(SimError::DuplicateNode { node: id });
        }
        let ix = self.graph.add_node(NodeData { id, x, y });
        self.index.insert(id, ix);
        self.order.push(id);
        Ok(())
    }

    /// Add an undirected edge weighted by its length.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, length: f64) -> SimResult<()> {
        if !length.is_finite() || length < 0.0 {
            return Err(SimError::InvalidEdge {
                from,
                to,
                reason: format!("length must be finite and >= 0, got {length}"),
            });
        }
        let a = self.node_index(from)?;
        let b = self.node_index(to)?;
        self.graph.add_edge(a, b, length);
        Ok(())
    }

    pub fn add_transit_stop(&mut self, node: NodeId) -> SimResult<()> {
        if !self.index.contains_key(&node) {
            return Err(SimError::UnknownTransitStop { node });
        }
        self.transit_stops.insert(node);
        Ok(())
    }

    pub fn with_transit_stops<I>(mut self, stops: I) -> SimResult<Self>
    where
        I: IntoIterator<Item = NodeId>,
    {
        for stop in stops {
            self.add_transit_stop(stop)?;
        }
        Ok(self)
    }

    pub fn from_file(file: GraphFile) -> SimResult<Self> {
        let mut graph = Self::new();
        for node in &file.nodes {
            graph.add_node(node.id, node.x, node.y)?;
        }
        for edge in &file.edges {
            graph.add_edge(edge.from, edge.to, edge.length)?;
        }
        graph.with_transit_stops(file.transit_stops)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let file: GraphFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let graph = Self::from_json(&content)?;
        log::info!(
            "Loaded graph from {}: {} nodes, {} edges, {} transit stops",
            path.as_ref().display(),
            graph.node_count(),
            graph.edge_count(),
            graph.transit_stops.len()
        );
        Ok(graph)
    }

    /// Rectangular lattice: node `row * cols + col` sits at
    /// `(col * spacing, row * spacing)` and links to its right and lower
    /// neighbours with edges of length `spacing`.
    pub fn grid(cols: u64, rows: u64, spacing: f64) -> SimResult<Self> {
        let mut graph = Self::new();
        for row in 0..rows {
            for col in 0..cols {
                let id = NodeId(row * cols + col);
                graph.add_node(id, col as f64 * spacing, row as f64 * spacing)?;
            }
        }
        for row in 0..rows {
            for col in 0..cols {
                let id = NodeId(row * cols + col);
                if col + 1 < cols {
                    graph.add_edge(id, NodeId(id.0 + 1), spacing)?;
                }
                if row + 1 < rows {
                    graph.add_edge(id, NodeId(id.0 + cols), spacing)?;
                }
            }
        }
        Ok(graph)
    }

    pub fn to_file(&self) -> GraphFile {
        let nodes = self
            .order
            .iter()
            .filter_map(|id| self.index.get(id).map(|&ix| self.graph[ix]))
            .collect();
        let edges = self
            .graph
            .raw_edges()
            .iter()
            .map(|e| EdgeData {
                from:   self.graph[e.source()].id,
                to:     self.graph[e.target()].id,
                length: e.weight,
            })
            .collect();
        GraphFile {
            nodes,
            edges,
            transit_stops: self.transit_stops.iter().copied().collect(),
        }
    }

    // ── Read-only accessors ────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    pub fn position(&self, node: NodeId) -> Option<Point> {
        self.index.get(&node).map(|&ix| self.graph[ix].point())
    }

    pub fn transit_stops(&self) -> &BTreeSet<NodeId> {
        &self.transit_stops
    }

    pub fn is_transit_stop(&self, node: NodeId) -> bool {
        self.transit_stops.contains(&node)
    }

    /// Adjacent nodes, ascending by id. Empty for an unknown node.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let Some(&ix) = self.index.get(&node) else {
            return Vec::new();
        };
        let mut out: Vec<NodeId> = self.graph.neighbors(ix).map(|n| self.graph[n].id).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub(crate) fn node_index(&self, node: NodeId) -> SimResult<NodeIndex> {
        self.index
            .get(&node)
            .copied()
            .ok_or(SimError::UnknownNode { node })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_expected_shape() {
        let g = SpatialGraph::grid(3, 2, 10.0).unwrap();
        assert_eq!(g.node_count(), 6);
        // 2 rows * 2 horizontal + 3 cols * 1 vertical
        assert_eq!(g.edge_count(), 7);
        assert_eq!(g.position(NodeId(5)), Some(Point::new(20.0, 10.0)));
        assert_eq!(g.neighbors(NodeId(1)), vec![NodeId(0), NodeId(2), NodeId(4)]);
    }

    #[test]
    fn rejects_duplicate_nodes_and_dangling_edges() {
        let mut g = SpatialGraph::new();
        g.add_node(NodeId(1), 0.0, 0.0).unwrap();
        assert!(matches!(
            g.add_node(NodeId(1), 1.0, 1.0),
            Err(SimError::DuplicateNode { .. })
        ));
        assert!(matches!(
            g.add_edge(NodeId(1), NodeId(2), 1.0),
            Err(SimError::UnknownNode { node: NodeId(2) })
        ));
        assert!(matches!(
            g.add_transit_stop(NodeId(9)),
            Err(SimError::UnknownTransitStop { .. })
        ));
    }

    #[test]
    fn rejects_negative_edge_length() {
        let mut g = SpatialGraph::new();
        g.add_node(NodeId(1), 0.0, 0.0).unwrap();
        g.add_node(NodeId(2), 1.0, 0.0).unwrap();
        assert!(matches!(
            g.add_edge(NodeId(1), NodeId(2), -1.0),
            Err(SimError::InvalidEdge { .. })
        ));
    }

    #[test]
    fn graph_file_preserves_stops_and_edges() {
        let json = r#"{
            "nodes": [
                {"id": 10, "x": 0.0, "y": 0.0},
                {"id": 20, "x": 3.0, "y": 4.0}
            ],
            "edges": [{"from": 10, "to": 20, "length": 5.0}],
            "transit_stops": [20]
        }"#;
        let g = SpatialGraph::from_json(json).unwrap();
        assert_eq!(g.nodes(), &[NodeId(10), NodeId(20)]);
        assert!(g.is_transit_stop(NodeId(20)));
        assert!(!g.is_transit_stop(NodeId(10)));

        let again = SpatialGraph::from_file(g.to_file()).unwrap();
        assert_eq!(again.edge_count(), 1);
        assert_eq!(again.transit_stops().len(), 1);
    }
}
