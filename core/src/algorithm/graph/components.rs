//! Weakly connected components
//!
//! Union-find over every edge, ignoring direction. Components are numbered
//! `0..component_count` in the order their first vertex is enumerated.
//!
//! [`IncrementalConnectedComponents`] keeps its union-find alive after the
//! computation and follows vertex and edge additions on an
//! [`ObservableGraph`]. Union-find cannot split a set, so an edge removal
//! only marks the result stale until the next computation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use log::{debug, warn};

use crate::algorithm::events::Subscription;
use crate::algorithm::state::AlgorithmCore;
use crate::algorithm::traits::{Algorithm, AlgorithmError};
use crate::data_structures::graph::{EdgeListGraph, VertexListGraph};
use crate::data_structures::observable::{GraphChange, ObservableGraph};
use crate::data_structures::union_find::UnionFind;

pub struct ConnectedComponents<'g, G: VertexListGraph + EdgeListGraph> {
    core: AlgorithmCore,
    graph: &'g G,
    /// Component per dense vertex index
    components: Vec<Option<usize>>,
    component_count: usize,
}

impl<'g, G: VertexListGraph + EdgeListGraph> ConnectedComponents<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            core: AlgorithmCore::new(),
            graph,
            components: Vec::new(),
            component_count: 0,
        }
    }

    pub fn component_count(&self) -> usize {
        self.component_count
    }

    pub fn component_of(&self, vertex: G::Vertex) -> Option<usize> {
        if !self.graph.contains_vertex(vertex) {
            return None;
        }
        self.components
            .get(self.graph.vertex_index(vertex))
            .copied()
            .flatten()
    }

    pub fn components(&self) -> HashMap<G::Vertex, usize> {
        self.graph
            .vertices()
            .filter_map(|vertex| Some((vertex, self.component_of(vertex)?)))
            .collect()
    }

    pub fn connected(&self, a: G::Vertex, b: G::Vertex) -> bool {
        match (self.component_of(a), self.component_of(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl<'g, G: VertexListGraph + EdgeListGraph> Algorithm for ConnectedComponents<'g, G> {
    fn name(&self) -> &'static str {
        "ConnectedComponents"
    }

    fn category(&self) -> &'static str {
        "connectivity"
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn initialize(&mut self) -> Result<(), AlgorithmError> {
        self.components.clear();
        self.component_count = 0;
        Ok(())
    }

    fn internal_compute(&mut self) -> Result<(), AlgorithmError> {
        let bound = self.graph.vertex_bound();
        let mut sets = UnionFind::new(bound);

        for edge in self.graph.edges() {
            if self.core.is_cancelling() {
                return Ok(());
            }
            let source = self.graph.vertex_index(self.graph.source(edge));
            let target = self.graph.vertex_index(self.graph.target(edge));
            sets.union(source, target);
        }

        let mut numbering: HashMap<usize, usize> = HashMap::new();
        self.components = vec![None; bound];
        for vertex in self.graph.vertices() {
            let index = self.graph.vertex_index(vertex);
            let next = numbering.len();
            let component = *numbering.entry(sets.find_set(index)).or_insert(next);
            self.components[index] = Some(component);
        }
        self.component_count = numbering.len();
        Ok(())
    }
}

/// Union-find state shared with the change subscription
struct IncrementalState<V> {
    elements: HashMap<V, usize>,
    sets: UnionFind,
    stale: bool,
}

impl<V: Copy + Eq + Hash> IncrementalState<V> {
    fn new() -> Self {
        Self {
            elements: HashMap::new(),
            sets: UnionFind::new(0),
            stale: false,
        }
    }

    fn add_vertex(&mut self, vertex: V) {
        if !self.elements.contains_key(&vertex) {
            let element = self.sets.make_set();
            self.elements.insert(vertex, element);
        }
    }

    fn add_edge(&mut self, source: V, target: V) {
        self.add_vertex(source);
        self.add_vertex(target);
        if let (Some(&a), Some(&b)) = (self.elements.get(&source), self.elements.get(&target)) {
            self.sets.union(a, b);
        }
    }

    fn apply<E>(&mut self, change: &GraphChange<V, E>) {
        match *change {
            GraphChange::VertexAdded(vertex) => self.add_vertex(vertex),
            GraphChange::EdgeAdded { source, target, .. } => self.add_edge(source, target),
            GraphChange::EdgeRemoved(_) => {
                if !self.stale {
                    warn!("edge removed, incremental components are stale until recomputed");
                }
                self.stale = true;
            }
        }
    }
}

/// Weakly connected components that stay current as the graph grows
///
/// The first `compute` builds the union-find from the graph and subscribes to
/// its changes. Later additions are folded in as they are raised; the
/// subscription ends when the algorithm is dropped or recomputed.
pub struct IncrementalConnectedComponents<'g, G>
where
    G: VertexListGraph + EdgeListGraph,
{
    core: AlgorithmCore,
    graph: &'g ObservableGraph<G>,
    state: Rc<RefCell<IncrementalState<G::Vertex>>>,
    subscription: Option<Subscription>,
}

impl<'g, G> IncrementalConnectedComponents<'g, G>
where
    G: VertexListGraph + EdgeListGraph,
{
    pub fn new(graph: &'g ObservableGraph<G>) -> Self {
        Self {
            core: AlgorithmCore::new(),
            graph,
            state: Rc::new(RefCell::new(IncrementalState::new())),
            subscription: None,
        }
    }

    /// Whether graph changes are being followed
    pub fn is_tracking(&self) -> bool {
        self.subscription.is_some()
    }

    /// Whether an edge was removed since the last computation
    ///
    /// A stale result may report vertices as connected that no longer are.
    pub fn is_stale(&self) -> bool {
        self.state.borrow().stale
    }

    pub fn component_count(&self) -> usize {
        self.state.borrow().sets.components()
    }

    pub fn connected(&self, a: G::Vertex, b: G::Vertex) -> bool {
        let mut state = self.state.borrow_mut();
        match (state.elements.get(&a).copied(), state.elements.get(&b).copied()) {
            (Some(a), Some(b)) => state.sets.connected(a, b),
            _ => false,
        }
    }
}

impl<'g, G> Algorithm for IncrementalConnectedComponents<'g, G>
where
    G: VertexListGraph + EdgeListGraph,
{
    fn name(&self) -> &'static str {
        "IncrementalConnectedComponents"
    }

    fn category(&self) -> &'static str {
        "connectivity"
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn initialize(&mut self) -> Result<(), AlgorithmError> {
        self.subscription = None;
        *self.state.borrow_mut() = IncrementalState::new();
        Ok(())
    }

    fn internal_compute(&mut self) -> Result<(), AlgorithmError> {
        {
            let graph = self.graph.graph()?;
            let mut state = self.state.borrow_mut();
            for vertex in graph.vertices() {
                state.add_vertex(vertex);
            }
            for edge in graph.edges() {
                if self.core.is_cancelling() {
                    debug!("{} cancelled before tracking changes", self.name());
                    return Ok(());
                }
                state.add_edge(graph.source(edge), graph.target(edge));
            }
        }

        let state = Rc::clone(&self.state);
        self.subscription = Some(
            self.graph
                .on_change(move |change| state.borrow_mut().apply(change)),
        );
        Ok(())
    }
}
