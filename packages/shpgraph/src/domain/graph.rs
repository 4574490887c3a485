//! Directed graph keyed by coordinates (petgraph-backed)
//!
//! Nodes are 2D coordinates, edges are ordered coordinate pairs. Both carry
//! an `Attributes` map. There is at most one edge per (source, target) pair;
//! re-adding a node or edge replaces its attributes wholesale.

use geo_types::{Geometry, LineString, Point};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use super::{Attributes, Coord};

/// Node weight stored in the underlying petgraph
#[derive(Debug, Clone, PartialEq)]
pub struct NodeWeight {
    pub coord: Coord,
    pub attributes: Attributes,
}

/// Identity of a graph element
///
/// Edges and nodes are told apart by shape, not by inspecting attribute
/// contents: an edge key is a coordinate pair, a node key a single coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphKey {
    Node(Coord),
    Edge(Coord, Coord),
}

impl GraphKey {
    /// Geometry synthesized from the key alone
    ///
    /// - `Node(c)` -> `Point(c)`
    /// - `Edge(s, t)` -> two-vertex `LineString [s, t]`
    pub fn fallback_geometry(&self) -> Geometry<f64> {
        match *self {
            GraphKey::Node(c) => Geometry::Point(Point::from(geo_types::Coord::from(c))),
            GraphKey::Edge(source, target) => Geometry::LineString(LineString::new(vec![
                source.into(),
                target.into(),
            ])),
        }
    }
}

/// Directed graph produced by the reader and consumed by the writer
///
/// # Examples
///
/// ```rust
/// use shpgraph::domain::{Attributes, Coord, ShpGraph};
///
/// let mut graph = ShpGraph::new();
/// graph.add_edge(Coord::new(0.0, 0.0), Coord::new(2.0, 2.0), Attributes::new());
///
/// assert_eq!(graph.node_count(), 2);
/// assert!(graph.contains_edge(Coord::new(0.0, 0.0), Coord::new(2.0, 2.0)));
/// assert!(!graph.contains_edge(Coord::new(2.0, 2.0), Coord::new(0.0, 0.0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShpGraph {
    graph: DiGraph<NodeWeight, Attributes>,
    coord_to_node: HashMap<Coord, NodeIndex>,
}

impl ShpGraph {
    /// Create empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert node `coord`, replacing any attributes it already has
    pub fn add_node(&mut self, coord: Coord, attributes: Attributes) -> NodeIndex {
        match self.coord_to_node.get(&coord) {
            Some(&idx) => {
                self.graph[idx].attributes = attributes;
                idx
            }
            None => {
                let idx = self.graph.add_node(NodeWeight { coord, attributes });
                self.coord_to_node.insert(coord, idx);
                idx
            }
        }
    }

    fn ensure_node(&mut self, coord: Coord) -> NodeIndex {
        match self.coord_to_node.get(&coord) {
            Some(&idx) => idx,
            None => self.add_node(coord, Attributes::new()),
        }
    }

    /// Insert edge `source -> target`, replacing any attributes it already has
    ///
    /// Missing endpoints are created with empty attributes.
    pub fn add_edge(&mut self, source: Coord, target: Coord, attributes: Attributes) {
        let from = self.ensure_node(source);
        let to = self.ensure_node(target);
        match self.graph.find_edge(from, to) {
            Some(edge) => self.graph[edge] = attributes,
            None => {
                self.graph.add_edge(from, to, attributes);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, coord: Coord) -> bool {
        self.coord_to_node.contains_key(&coord)
    }

    pub fn contains_edge(&self, source: Coord, target: Coord) -> bool {
        self.edge_attributes(source, target).is_some()
    }

    pub fn node_attributes(&self, coord: Coord) -> Option<&Attributes> {
        self.coord_to_node
            .get(&coord)
            .map(|&idx| &self.graph[idx].attributes)
    }

    pub fn edge_attributes(&self, source: Coord, target: Coord) -> Option<&Attributes> {
        let from = *self.coord_to_node.get(&source)?;
        let to = *self.coord_to_node.get(&target)?;
        self.graph.find_edge(from, to).map(|edge| &self.graph[edge])
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (Coord, &Attributes)> {
        self.graph
            .node_weights()
            .map(|weight| (weight.coord, &weight.attributes))
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (Coord, Coord, &Attributes)> {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].coord,
                self.graph[edge.target()].coord,
                edge.weight(),
            )
        })
    }

    /// Targets of edges leaving `coord`
    pub fn successors(&self, coord: Coord) -> Vec<Coord> {
        self.neighbors(coord, Direction::Outgoing)
    }

    /// Sources of edges entering `coord`
    pub fn predecessors(&self, coord: Coord) -> Vec<Coord> {
        self.neighbors(coord, Direction::Incoming)
    }

    fn neighbors(&self, coord: Coord, direction: Direction) -> Vec<Coord> {
        match self.coord_to_node.get(&coord) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, direction)
                .map(|n| self.graph[n].coord)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Underlying petgraph, for running graph algorithms
    pub fn as_petgraph(&self) -> &DiGraph<NodeWeight, Attributes> {
        &self.graph
    }
}

/// Same node set, same edge set, same attributes; insertion order ignored
impl PartialEq for ShpGraph {
    fn eq(&self, other: &Self) -> bool {
        self.node_count() == other.node_count()
            && self.edge_count() == other.edge_count()
            && self
                .nodes()
                .all(|(coord, attrs)| other.node_attributes(coord) == Some(attrs))
            && self
                .edges()
                .all(|(s, t, attrs)| other.edge_attributes(s, t) == Some(attrs))
    }
}
