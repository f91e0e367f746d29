//! Spatial query layer: proximity and routing over the shared graph.
//!
//! Proximity is planar (Euclidean between node coordinates), never
//! path distance. Routing uses edge length as weight.
//!
//! Path tie-break: petgraph's A* with a zero heuristic (plain Dijkstra).
//! Among equal-weight paths the winner is fixed by the graph's insertion
//! order, so a fixed graph always yields the same next hop.

use crate::{graph::SpatialGraph, types::NodeId};
use petgraph::algo::astar;

impl SpatialGraph {
    /// Euclidean distance between two nodes' coordinates.
    /// An unknown node is infinitely far from everything.
    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        match (self.position(a), self.position(b)) {
            (Some(pa), Some(pb)) => pa.distance_to(&pb),
            _ => f64::INFINITY,
        }
    }

    /// Every node within `radius` (inclusive) of `center`, in node order.
    pub fn nodes_within_radius(&self, center: NodeId, radius: f64) -> Vec<NodeId> {
        let Some(origin) = self.position(center) else {
            return Vec::new();
        };
        self.nodes()
            .iter()
            .copied()
            .filter(|&n| {
                self.position(n)
                    .is_some_and(|p| p.distance_to(&origin) <= radius)
            })
            .collect()
    }

    /// Second node of the weighted shortest path from `source` to `target`.
    /// `None` when source == target, either node is unknown, or no path exists.
    pub fn shortest_path_next_hop(&self, source: NodeId, target: NodeId) -> Option<NodeId> {
        if source == target {
            return None;
        }
        let start = self.index.get(&source).copied()?;
        let goal = self.index.get(&target).copied()?;
        let (_cost, path) = astar(
            &self.graph,
            start,
            |n| n == goal,
            |e| *e.weight(),
            |_| 0.0,
        )?;
        path.get(1).map(|&ix| self.graph[ix].id)
    }

    /// Transit stop nearest to `node`, with its distance.
    /// Ties go to the lowest stop id.
    pub fn nearest_stop(&self, node: NodeId) -> Option<(NodeId, f64)> {
        let mut best: Option<(NodeId, f64)> = None;
        for &stop in self.transit_stops() {
            let d = self.distance(node, stop);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((stop, d));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> SpatialGraph {
        // 0 -- 1 -- 2      3 (isolated)
        let mut g = SpatialGraph::new();
        for (i, x) in [0.0, 1.0, 2.0, 10.0].into_iter().enumerate() {
            g.add_node(NodeId(i as u64), x, 0.0).unwrap();
        }
        g.add_edge(NodeId(0), NodeId(1), 1.0).unwrap();
        g.add_edge(NodeId(1), NodeId(2), 1.0).unwrap();
        g
    }

    #[test]
    fn distance_is_planar_not_path_length() {
        let g = line();
        assert_eq!(g.distance(NodeId(0), NodeId(3)), 10.0);
        assert_eq!(g.distance(NodeId(0), NodeId(99)), f64::INFINITY);
    }

    #[test]
    fn radius_query_is_inclusive_and_never_fails() {
        let g = line();
        assert_eq!(
            g.nodes_within_radius(NodeId(1), 1.0),
            vec![NodeId(0), NodeId(1), NodeId(2)]
        );
        assert_eq!(g.nodes_within_radius(NodeId(3), 0.5), vec![NodeId(3)]);
        assert!(g.nodes_within_radius(NodeId(42), 100.0).is_empty());
    }

    #[test]
    fn next_hop_follows_path_and_handles_dead_ends() {
        let g = line();
        assert_eq!(g.shortest_path_next_hop(NodeId(0), NodeId(2)), Some(NodeId(1)));
        assert_eq!(g.shortest_path_next_hop(NodeId(2), NodeId(0)), Some(NodeId(1)));
        assert_eq!(g.shortest_path_next_hop(NodeId(1), NodeId(1)), None);
        assert_eq!(g.shortest_path_next_hop(NodeId(0), NodeId(3)), None);
    }

    #[test]
    fn next_hop_prefers_lighter_route_over_fewer_hops() {
        //   0 --(10)-- 3
        //   |          |
        //  (1)        (1)
        //   |          |
        //   1 --(1)--  2
        let mut g = SpatialGraph::new();
        for i in 0..4 {
            g.add_node(NodeId(i), i as f64, 0.0).unwrap();
        }
        g.add_edge(NodeId(0), NodeId(3), 10.0).unwrap();
        g.add_edge(NodeId(0), NodeId(1), 1.0).unwrap();
        g.add_edge(NodeId(1), NodeId(2), 1.0).unwrap();
        g.add_edge(NodeId(2), NodeId(3), 1.0).unwrap();
        assert_eq!(g.shortest_path_next_hop(NodeId(0), NodeId(3)), Some(NodeId(1)));
    }

    #[test]
    fn nearest_stop_breaks_ties_by_lowest_id() {
        let g = line()
            .with_transit_stops([NodeId(2), NodeId(0)])
            .unwrap();
        assert_eq!(g.nearest_stop(NodeId(1)), Some((NodeId(0), 1.0)));
        assert_eq!(line().nearest_stop(NodeId(1)), None);
    }
}
