//! Graph wrapper that announces structural changes
//!
//! [`ObservableGraph`] owns a graph and raises a [`GraphChange`] after every
//! vertex or edge it adds or removes. Mutation goes through `&self`, so an
//! algorithm can keep a shared reference to the graph and a subscription to
//! its changes while the caller keeps growing it.

use std::cell::{Ref, RefCell};

use crate::algorithm::events::{Event, Subscription};
use crate::algorithm::traits::AlgorithmError;
use crate::data_structures::graph::{GraphBase, MutableEdgeGraph, MutableVertexGraph};

/// Structural change raised after it has been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphChange<V, E> {
    VertexAdded(V),
    EdgeAdded { edge: E, source: V, target: V },
    EdgeRemoved(E),
}

pub struct ObservableGraph<G: GraphBase> {
    graph: RefCell<G>,
    changes: Event<GraphChange<G::Vertex, G::Edge>>,
}

impl<G: GraphBase> ObservableGraph<G> {
    pub fn new(graph: G) -> Self {
        Self {
            graph: RefCell::new(graph),
            changes: Event::new(),
        }
    }

    /// Read access to the wrapped graph
    ///
    /// Mutations fail with [`AlgorithmError::GraphBorrowed`] while the
    /// returned guard is alive.
    pub fn graph(&self) -> Result<Ref<'_, G>, AlgorithmError> {
        self.graph.try_borrow().map_err(|_| AlgorithmError::GraphBorrowed)
    }

    pub fn into_inner(self) -> G {
        self.graph.into_inner()
    }

    pub fn changes(&self) -> &Event<GraphChange<G::Vertex, G::Edge>> {
        &self.changes
    }

    pub fn on_change(&self, handler: impl FnMut(&GraphChange<G::Vertex, G::Edge>) + 'static) -> Subscription {
        self.changes.subscribe(handler)
    }

    /// Applies `change` to the graph, releasing the borrow before returning
    fn mutate<T>(&self, change: impl FnOnce(&mut G) -> T) -> Result<T, AlgorithmError> {
        let mut graph = self
            .graph
            .try_borrow_mut()
            .map_err(|_| AlgorithmError::GraphBorrowed)?;
        Ok(change(&mut *graph))
    }
}

impl<G: MutableVertexGraph> ObservableGraph<G> {
    pub fn add_vertex(&self) -> Result<G::Vertex, AlgorithmError> {
        let vertex = self.mutate(|graph| graph.add_vertex())?;
        self.changes.raise(&GraphChange::VertexAdded(vertex));
        Ok(vertex)
    }
}

impl<G: MutableEdgeGraph> ObservableGraph<G> {
    pub fn add_edge(&self, source: G::Vertex, target: G::Vertex) -> Result<G::Edge, AlgorithmError> {
        let edge = self.mutate(|graph| graph.add_edge(source, target))??;
        self.changes.raise(&GraphChange::EdgeAdded { edge, source, target });
        Ok(edge)
    }

    /// Returns `Ok(true)` if the edge existed
    pub fn remove_edge(&self, edge: G::Edge) -> Result<bool, AlgorithmError> {
        let removed = self.mutate(|graph| graph.remove_edge(edge))?;
        if removed {
            self.changes.raise(&GraphChange::EdgeRemoved(edge));
        }
        Ok(removed)
    }
}
