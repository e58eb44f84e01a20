//! Graph capability interfaces and a reference adjacency-list graph
//!
//! Algorithms in this crate never depend on a concrete storage type. Each one
//! names the smallest set of capabilities it needs (vertex enumeration,
//! out-edge incidence, in-edge incidence, edge enumeration, edge mutation)
//! and is generic over any graph providing them.
//!
//! # Vertex indexing
//! Every vertex-list graph hands out a dense integer index per vertex
//! (`vertex_index`), bounded by `vertex_bound`. Per-run algorithm state
//! (colors, distances) lives in plain vectors addressed by that index.
//!
//! Copyright (c) 2025 Quiver Contributors

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::algorithm::traits::AlgorithmError;

/// Dense vertex identifier used by [`AdjacencyGraph`]
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct VertexId(pub usize);

impl VertexId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Stable edge identifier used by [`AdjacencyGraph`]
///
/// Identifiers are never reused, so an id obtained before a removal keeps
/// pointing at nothing rather than at a different edge.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Vertex and edge types shared by every capability, plus edge endpoints
pub trait GraphBase {
    type Vertex: Copy + Eq + Hash + Debug + 'static;
    type Edge: Copy + Eq + Hash + Debug + 'static;

    /// Tail of an edge
    ///
    /// # Panics
    /// Implementations may panic when `edge` was removed or belongs to
    /// another graph. Algorithms only pass edges the graph enumerated.
    fn source(&self, edge: Self::Edge) -> Self::Vertex;

    /// Head of an edge
    ///
    /// # Panics
    /// Same precondition as [`GraphBase::source`].
    fn target(&self, edge: Self::Edge) -> Self::Vertex;

    fn is_directed(&self) -> bool {
        true
    }
}

/// Graphs that can enumerate their vertices and index them densely
pub trait VertexListGraph: GraphBase {
    /// Vertices in enumeration order. Forest-mode traversals restart in this order.
    fn vertices(&self) -> impl Iterator<Item = Self::Vertex> + '_;

    fn vertex_count(&self) -> usize;

    /// Dense index in `0..vertex_bound()`
    fn vertex_index(&self, vertex: Self::Vertex) -> usize;

    /// One past the largest index `vertex_index` may return
    fn vertex_bound(&self) -> usize {
        self.vertex_count()
    }

    fn contains_vertex(&self, vertex: Self::Vertex) -> bool;

    fn is_vertices_empty(&self) -> bool {
        self.vertex_count() == 0
    }
}

/// Graphs that can enumerate the out-edges of a vertex
pub trait IncidenceGraph: GraphBase {
    fn out_edges(&self, vertex: Self::Vertex) -> impl Iterator<Item = Self::Edge> + '_;

    fn out_degree(&self, vertex: Self::Vertex) -> usize {
        self.out_edges(vertex).count()
    }

    /// First out-edge of `source` pointing at `target`, in enumeration order
    fn find_edge(&self, source: Self::Vertex, target: Self::Vertex) -> Option<Self::Edge> {
        self.out_edges(source).find(|&edge| self.target(edge) == target)
    }

    fn contains_edge(&self, source: Self::Vertex, target: Self::Vertex) -> bool {
        self.find_edge(source, target).is_some()
    }
}

/// Incidence graphs that also expose in-edges
pub trait BidirectionalGraph: IncidenceGraph {
    fn in_edges(&self, vertex: Self::Vertex) -> impl Iterator<Item = Self::Edge> + '_;

    fn in_degree(&self, vertex: Self::Vertex) -> usize {
        self.in_edges(vertex).count()
    }
}

/// Graphs that can enumerate all of their edges
pub trait EdgeListGraph: GraphBase {
    fn edges(&self) -> impl Iterator<Item = Self::Edge> + '_;

    fn edge_count(&self) -> usize;
}

/// Graphs whose edge set can be changed
pub trait MutableEdgeGraph: GraphBase {
    fn add_edge(
        &mut self,
        source: Self::Vertex,
        target: Self::Vertex,
    ) -> Result<Self::Edge, AlgorithmError>;

    /// Returns `true` if the edge existed
    fn remove_edge(&mut self, edge: Self::Edge) -> bool;
}

/// Graphs that can grow new vertices
pub trait MutableVertexGraph: GraphBase {
    fn add_vertex(&mut self) -> Self::Vertex;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct EdgeRecord {
    source: VertexId,
    target: VertexId,
}

/// Directed multigraph backed by adjacency lists
///
/// Vertices are numbered densely from zero and are never removed. Edges keep
/// their identifiers across removals of other edges. Out-edges and in-edges
/// are enumerated in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjacencyGraph {
    out_adjacency: Vec<Vec<EdgeId>>,
    in_adjacency: Vec<Vec<EdgeId>>,
    edges: Vec<Option<EdgeRecord>>,
    live_edges: usize,
}

impl AdjacencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with `count` isolated vertices
    pub fn with_vertices(count: usize) -> Self {
        let mut graph = Self::new();
        graph.add_vertices(count);
        graph
    }

    /// Builds a graph from `(source, target)` index pairs
    pub fn from_edges(vertex_count: usize, edges: &[(usize, usize)]) -> Result<Self, AlgorithmError> {
        let mut graph = Self::with_vertices(vertex_count);
        for &(source, target) in edges {
            graph.add_edge(VertexId(source), VertexId(target))?;
        }
        Ok(graph)
    }

    pub fn add_vertex(&mut self) -> VertexId {
        let id = VertexId(self.out_adjacency.len());
        self.out_adjacency.push(Vec::new());
        self.in_adjacency.push(Vec::new());
        id
    }

    pub fn add_vertices(&mut self, count: usize) -> Vec<VertexId> {
        (0..count).map(|_| self.add_vertex()).collect()
    }

    /// Endpoints of a live edge
    pub fn endpoints(&self, edge: EdgeId) -> Option<(VertexId, VertexId)> {
        self.edges
            .get(edge.0)
            .copied()
            .flatten()
            .map(|record| (record.source, record.target))
    }

    pub fn contains_edge_id(&self, edge: EdgeId) -> bool {
        self.endpoints(edge).is_some()
    }

    fn record(&self, edge: EdgeId) -> EdgeRecord {
        match self.edges.get(edge.0).copied().flatten() {
            Some(record) => record,
            None => panic!("edge {edge} does not belong to this graph"),
        }
    }

    fn check_vertex(&self, vertex: VertexId) -> Result<(), AlgorithmError> {
        if vertex.0 < self.out_adjacency.len() {
            Ok(())
        } else {
            Err(AlgorithmError::InvalidVertex(vertex.to_string()))
        }
    }
}

impl GraphBase for AdjacencyGraph {
    type Vertex = VertexId;
    type Edge = EdgeId;

    fn source(&self, edge: EdgeId) -> VertexId {
        self.record(edge).source
    }

    fn target(&self, edge: EdgeId) -> VertexId {
        self.record(edge).target
    }
}

impl VertexListGraph for AdjacencyGraph {
    fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.out_adjacency.len()).map(VertexId)
    }

    fn vertex_count(&self) -> usize {
        self.out_adjacency.len()
    }

    #[inline]
    fn vertex_index(&self, vertex: VertexId) -> usize {
        vertex.0
    }

    fn contains_vertex(&self, vertex: VertexId) -> bool {
        vertex.0 < self.out_adjacency.len()
    }
}

impl IncidenceGraph for AdjacencyGraph {
    fn out_edges(&self, vertex: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_adjacency
            .get(vertex.0)
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    fn out_degree(&self, vertex: VertexId) -> usize {
        self.out_adjacency.get(vertex.0).map_or(0, Vec::len)
    }
}

impl BidirectionalGraph for AdjacencyGraph {
    fn in_edges(&self, vertex: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.in_adjacency
            .get(vertex.0)
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    fn in_degree(&self, vertex: VertexId) -> usize {
        self.in_adjacency.get(vertex.0).map_or(0, Vec::len)
    }
}

impl EdgeListGraph for AdjacencyGraph {
    fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, record)| record.is_some())
            .map(|(index, _)| EdgeId(index))
    }

    fn edge_count(&self) -> usize {
        self.live_edges
    }
}

impl MutableEdgeGraph for AdjacencyGraph {
    fn add_edge(&mut self, source: VertexId, target: VertexId) -> Result<EdgeId, AlgorithmError> {
        self.check_vertex(source)?;
        self.check_vertex(target)?;

        let id = EdgeId(self.edges.len());
        self.edges.push(Some(EdgeRecord { source, target }));
        self.out_adjacency[source.0].push(id);
        self.in_adjacency[target.0].push(id);
        self.live_edges += 1;
        Ok(id)
    }

    fn remove_edge(&mut self, edge: EdgeId) -> bool {
        let Some(record) = self.edges.get_mut(edge.0).and_then(Option::take) else {
            return false;
        };
        self.out_adjacency[record.source.0].retain(|&e| e != edge);
        self.in_adjacency[record.target.0].retain(|&e| e != edge);
        self.live_edges -= 1;
        true
    }
}

impl MutableVertexGraph for AdjacencyGraph {
    fn add_vertex(&mut self) -> VertexId {
        AdjacencyGraph::add_vertex(self)
    }
}

/// Edge-predicate view over another graph
///
/// Vertices pass through untouched; only edges accepted by the predicate are
/// enumerated as out-edges. Used to expose the residual graph of a flow
/// network without copying it.
pub struct FilteredGraph<'g, G, P> {
    graph: &'g G,
    predicate: P,
}

impl<'g, G, P> FilteredGraph<'g, G, P>
where
    G: GraphBase,
    P: Fn(G::Edge) -> bool,
{
    pub fn new(graph: &'g G, predicate: P) -> Self {
        Self { graph, predicate }
    }

    pub fn inner(&self) -> &'g G {
        self.graph
    }

    pub fn accepts(&self, edge: G::Edge) -> bool {
        (self.predicate)(edge)
    }
}

impl<'g, G, P> GraphBase for FilteredGraph<'g, G, P>
where
    G: GraphBase,
    P: Fn(G::Edge) -> bool,
{
    type Vertex = G::Vertex;
    type Edge = G::Edge;

    fn source(&self, edge: Self::Edge) -> Self::Vertex {
        self.graph.source(edge)
    }

    fn target(&self, edge: Self::Edge) -> Self::Vertex {
        self.graph.target(edge)
    }

    fn is_directed(&self) -> bool {
        self.graph.is_directed()
    }
}

impl<'g, G, P> VertexListGraph for FilteredGraph<'g, G, P>
where
    G: VertexListGraph,
    P: Fn(G::Edge) -> bool,
{
    fn vertices(&self) -> impl Iterator<Item = Self::Vertex> + '_ {
        self.graph.vertices()
    }

    fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    fn vertex_index(&self, vertex: Self::Vertex) -> usize {
        self.graph.vertex_index(vertex)
    }

    fn vertex_bound(&self) -> usize {
        self.graph.vertex_bound()
    }

    fn contains_vertex(&self, vertex: Self::Vertex) -> bool {
        self.graph.contains_vertex(vertex)
    }
}

impl<'g, G, P> IncidenceGraph for FilteredGraph<'g, G, P>
where
    G: IncidenceGraph,
    P: Fn(G::Edge) -> bool,
{
    fn out_edges(&self, vertex: Self::Vertex) -> impl Iterator<Item = Self::Edge> + '_ {
        self.graph
            .out_edges(vertex)
            .filter(move |&edge| (self.predicate)(edge))
    }
}

impl<'g, G, P> EdgeListGraph for FilteredGraph<'g, G, P>
where
    G: EdgeListGraph,
    P: Fn(G::Edge) -> bool,
{
    fn edges(&self) -> impl Iterator<Item = Self::Edge> + '_ {
        self.graph.edges().filter(move |&edge| (self.predicate)(edge))
    }

    fn edge_count(&self) -> usize {
        self.edges().count()
    }
}
