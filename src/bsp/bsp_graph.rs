// src/bsp/bsp_graph.rs

use crate::utils::Cell;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use union_find::{QuickUnionUf, UnionBySize, UnionFind};

/// Undirected connection between two rooms. Equality and hashing ignore the
/// endpoint order and the weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    /// Euclidean distance between room centres.
    pub weight: f64,
}

impl Edge {
    pub fn new(a: usize, b: usize, weight: f64) -> Self {
        Edge { a, b, weight }
    }

    /// `(min, max)` endpoint pair.
    pub fn key(&self) -> (usize, usize) {
        (self.a.min(self.b), self.a.max(self.b))
    }

    pub fn touches(&self, room: usize) -> bool {
        self.a == room || self.b == room
    }

    /// The endpoint that isn't `room`.
    pub fn other(&self, room: usize) -> usize {
        if self.a == room {
            self.b
        } else {
            self.a
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Every pair of rooms, sorted ascending by weight (stable on ties).
pub fn build_all_edges(centers: &[Cell]) -> Vec<Edge> {
    let n = centers.len();
    let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            edges.push(Edge::new(i, j, centers[i].distance_to(&centers[j])));
        }
    }
    edges.sort_by(|x, y| x.weight.total_cmp(&y.weight));
    edges
}

/// Minimum spanning tree over `n` rooms. `edges` must be sorted ascending.
pub fn kruskal(n: usize, edges: &[Edge]) -> Vec<Edge> {
    let mut uf = QuickUnionUf::<UnionBySize>::new(n);
    let mut tree = Vec::with_capacity(n.saturating_sub(1));
    for e in edges {
        if tree.len() + 1 >= n.max(1) {
            break;
        }
        if uf.find(e.a) != uf.find(e.b) {
            uf.union(e.a, e.b);
            tree.push(*e);
        }
    }
    tree
}

/// Greedily picks up to `count` non-tree edges, shortest first, rejecting any
/// whose endpoints already share a neighbour.
pub fn select_extra_edges(n: usize, edges: &[Edge], tree: &[Edge], count: usize) -> Vec<Edge> {
    let mut adjacency: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    for e in tree {
        adjacency[e.a].insert(e.b);
        adjacency[e.b].insert(e.a);
    }
    let in_tree: HashSet<Edge> = tree.iter().copied().collect();

    let mut extra = Vec::new();
    for e in edges {
        if extra.len() >= count {
            break;
        }
        if in_tree.contains(e) || adjacency[e.a].contains(&e.b) {
            continue;
        }
        if adjacency[e.a].intersection(&adjacency[e.b]).next().is_some() {
            debug!("Extra edge {}-{} would close a triangle; skipped", e.a, e.b);
            continue;
        }
        adjacency[e.a].insert(e.b);
        adjacency[e.b].insert(e.a);
        extra.push(*e);
    }
    extra
}

/// Spanning tree plus loop edges over the placed rooms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGraph {
    pub room_count: usize,
    pub tree: Vec<Edge>,
    pub extra: Vec<Edge>,
}

impl ConnectionGraph {
    /// Builds the graph for rooms with the given centres.
    pub fn build(centers: &[Cell], extra_connections: usize) -> Self {
        let n = centers.len();
        let edges = build_all_edges(centers);
        let tree = kruskal(n, &edges);
        let extra = select_extra_edges(n, &edges, &tree, extra_connections);
        debug!(
            "Graph over {} rooms: {} candidate edges, {} tree, {} extra",
            n,
            edges.len(),
            tree.len(),
            extra.len()
        );
        ConnectionGraph {
            room_count: n,
            tree,
            extra,
        }
    }

    /// Tree edges first, then extras; this is the carving order.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.tree.iter().chain(self.extra.iter())
    }

    /// Sorted neighbours of `room`.
    pub fn neighbors(&self, room: usize) -> Vec<usize> {
        let set: BTreeSet<usize> = self.all_edges().filter(|e| e.touches(room)).map(|e| e.other(room)).collect();
        set.into_iter().collect()
    }

    pub fn is_connected(&self) -> bool {
        if self.room_count == 0 {
            return true;
        }
        let mut seen = vec![false; self.room_count];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        while let Some(r) = queue.pop_front() {
            for n in self.neighbors(r) {
                if n < self.room_count && !seen[n] {
                    seen[n] = true;
                    queue.push_back(n);
                }
            }
        }
        seen.iter().all(|s| *s)
    }

    /// Whether any extra edge closes a 3-cycle with the rest of the graph.
    pub fn extra_closes_triangle(&self) -> bool {
        self.extra.iter().any(|e| {
            let na = self.neighbors(e.a);
            self.neighbors(e.b).iter().any(|n| na.contains(n))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn grid_centers() -> Vec<Cell> {
        // 3x3 lattice, spacing 10
        (0..3).flat_map(|x| (0..3).map(move |y| Cell::new(x * 10, y * 10))).collect()
    }

    #[test]
    fn test_edge_equality_is_symmetric() {
        let e1 = Edge::new(2, 5, 3.0);
        let e2 = Edge::new(5, 2, 9.0);
        assert_eq!(e1, e2);
        let set: HashSet<Edge> = [e1, e2].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(e1.other(2), 5);
    }

    #[test]
    fn test_all_edges_sorted() {
        let edges = build_all_edges(&grid_centers());
        assert_eq!(edges.len(), 36);
        assert!(edges.windows(2).all(|w| w[0].weight <= w[1].weight));
        assert_approx_eq!(edges[0].weight, 10.0);
    }

    #[test]
    fn test_kruskal_spans() {
        let centers = grid_centers();
        let edges = build_all_edges(&centers);
        let tree = kruskal(centers.len(), &edges);
        assert_eq!(tree.len(), 8);
        let total: f64 = tree.iter().map(|e| e.weight).sum();
        assert_approx_eq!(total, 80.0);

        let g = ConnectionGraph {
            room_count: 9,
            tree,
            extra: Vec::new(),
        };
        assert!(g.is_connected());
    }

    #[test]
    fn test_kruskal_degenerate_sizes() {
        assert!(kruskal(0, &[]).is_empty());
        assert!(kruskal(1, &[]).is_empty());
        let two = build_all_edges(&[Cell::new(0, 0), Cell::new(4, 0)]);
        assert_eq!(kruskal(2, &two).len(), 1);
    }

    #[test]
    fn test_extra_edges_never_close_triangles() {
        let centers = vec![Cell::new(0, 0), Cell::new(10, 0), Cell::new(5, 8), Cell::new(30, 0)];
        for count in 0..4 {
            let g = ConnectionGraph::build(&centers, count);
            assert_eq!(g.tree.len(), 3);
            assert!(g.extra.len() <= count);
            assert!(!g.extra_closes_triangle());
            assert!(g.is_connected());
        }

        // 0,1,2 form a tight triangle: the closing edge must be rejected
        let g = ConnectionGraph::build(&centers[..3], 5);
        assert!(g.extra.is_empty());
    }

    #[test]
    fn test_extra_edges_on_lattice() {
        let g = ConnectionGraph::build(&grid_centers(), 3);
        assert!(!g.extra.is_empty());
        assert!(!g.extra_closes_triangle());
        for e in &g.extra {
            assert!(!g.tree.contains(e));
        }
    }

    #[test]
    fn test_disconnected_graph_detected() {
        let g = ConnectionGraph {
            room_count: 3,
            tree: vec![Edge::new(0, 1, 1.0)],
            extra: Vec::new(),
        };
        assert!(!g.is_connected());
        assert_eq!(g.neighbors(1), vec![0]);
    }
}
