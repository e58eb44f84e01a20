//! Edmonds-Karp maximum flow
//!
//! # Algorithmic Complexity
//! - Time: O(V * E^2)
//! - Space: O(V + E)
//!
//! Repeatedly finds a shortest augmenting path with a breadth-first search
//! over the residual graph (edges whose residual capacity exceeds
//! `flow_epsilon`). The path's bottleneck `delta` is subtracted from each of
//! its edges and added to their reverse counterparts. The search ends when the
//! sink is no longer reachable; the vertices still reachable from the source
//! then form the source side of a minimum cut.
//!
//! Every edge needs a reverse edge in `reversed_edges`, usually produced by a
//! [`ReversedEdgeAugmentor`]. Synthetic reverse edges must have capacity 0.
//! [`maximum_flow`] wires all of this together for one call.
//!
//! Copyright (c) 2025 Quiver Contributors

use std::collections::{HashMap, HashSet};

use log::{debug, info, trace};
use serde::Serialize;

use crate::algorithm::events::{Event, Subscription};
use crate::algorithm::graph::augmentor::ReversedEdgeAugmentor;
use crate::algorithm::observers::{Observable, VertexPredecessorRecorder, VertexRecorder};
use crate::algorithm::path_finding::describe_edge;
use crate::algorithm::rooted::{RootedAlgorithm, SearchAlgorithm, SearchRoots};
use crate::algorithm::state::AlgorithmCore;
use crate::algorithm::traits::{parse_parameter, Algorithm, AlgorithmError};
use crate::algorithm::traversal::BreadthFirstSearch;
use crate::data_structures::graph::{
    EdgeListGraph, FilteredGraph, IncidenceGraph, MutableEdgeGraph, VertexListGraph,
};

/// One augmenting path and the flow pushed along it
#[derive(Debug, Clone, PartialEq)]
pub struct Augmentation<E> {
    pub path: Vec<E>,
    pub delta: f64,
}

/// Outcome of a maximum flow computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxFlowResult<V, E>
where
    V: std::hash::Hash + Eq,
    E: std::hash::Hash + Eq,
{
    pub value: f64,
    /// Flow on each edge, never negative
    pub flows: HashMap<E, f64>,
    /// Vertices reachable from the source in the final residual graph
    pub source_side: HashSet<V>,
}

enum ResidualSearch<V, E> {
    Path(Vec<E>),
    /// The sink is unreachable; carries the vertices that were reached
    Cut(HashSet<V>),
}

pub struct EdmondsKarpMaximumFlow<'g, G, C>
where
    G: IncidenceGraph + VertexListGraph + EdgeListGraph,
    C: Fn(G::Edge) -> f64,
{
    core: AlgorithmCore,
    graph: &'g G,
    capacities: C,
    reversed_edges: &'g HashMap<G::Edge, G::Edge>,
    roots: SearchRoots<G::Vertex>,
    residual: HashMap<G::Edge, f64>,
    flow_epsilon: f64,
    max_augmentations: Option<usize>,
    augmentations: usize,
    max_flow: f64,
    source_side: HashSet<G::Vertex>,
    augmented: Event<Augmentation<G::Edge>>,
}

impl<'g, G, C> EdmondsKarpMaximumFlow<'g, G, C>
where
    G: IncidenceGraph + VertexListGraph + EdgeListGraph,
    C: Fn(G::Edge) -> f64,
{
    pub fn new(graph: &'g G, capacities: C, reversed_edges: &'g HashMap<G::Edge, G::Edge>) -> Self {
        Self {
            core: AlgorithmCore::new(),
            graph,
            capacities,
            reversed_edges,
            roots: SearchRoots::new(),
            residual: HashMap::new(),
            flow_epsilon: 0.0,
            max_augmentations: None,
            augmentations: 0,
            max_flow: 0.0,
            source_side: HashSet::new(),
            augmented: Event::new(),
        }
    }

    pub fn source(&self) -> Option<G::Vertex> {
        self.roots.root()
    }

    pub fn set_source(&mut self, source: G::Vertex) {
        self.roots.set_root(Some(source));
    }

    pub fn sink(&self) -> Option<G::Vertex> {
        self.roots.goal()
    }

    pub fn set_sink(&mut self, sink: G::Vertex) {
        self.roots.set_goal(Some(sink));
    }

    pub fn flow_epsilon(&self) -> f64 {
        self.flow_epsilon
    }

    pub fn set_flow_epsilon(&mut self, epsilon: f64) {
        self.flow_epsilon = epsilon;
    }

    pub fn set_max_augmentations(&mut self, limit: Option<usize>) {
        self.max_augmentations = limit;
    }

    /// Total flow leaving the source after the last run
    pub fn max_flow(&self) -> f64 {
        self.max_flow
    }

    pub fn augmentations(&self) -> usize {
        self.augmentations
    }

    pub fn residual_capacity(&self, edge: G::Edge) -> Option<f64> {
        self.residual.get(&edge).copied()
    }

    pub fn residual_capacities(&self) -> &HashMap<G::Edge, f64> {
        &self.residual
    }

    /// Net flow on `edge`, negative when flow was pushed back along it
    pub fn flow(&self, edge: G::Edge) -> Option<f64> {
        let residual = self.residual.get(&edge)?;
        Some((self.capacities)(edge) - residual)
    }

    pub fn source_side(&self) -> &HashSet<G::Vertex> {
        &self.source_side
    }

    pub fn on_augmentation(
        &self,
        handler: impl FnMut(&Augmentation<G::Edge>) + 'static,
    ) -> Subscription {
        self.augmented.subscribe(handler)
    }

    /// Collects the result, keeping only the edges accepted by `include`
    pub fn result(&self, include: impl Fn(G::Edge) -> bool) -> MaxFlowResult<G::Vertex, G::Edge> {
        let flows = self
            .residual
            .iter()
            .filter(|&(&edge, _)| include(edge))
            .map(|(&edge, &residual)| (edge, ((self.capacities)(edge) - residual).max(0.0)))
            .collect();

        MaxFlowResult {
            value: self.max_flow,
            flows,
            source_side: self.source_side.clone(),
        }
    }

    fn endpoints(&self) -> Result<(G::Vertex, G::Vertex), AlgorithmError> {
        let source = self.roots.require_root()?;
        let sink = self.roots.goal().ok_or(AlgorithmError::MissingRootVertex)?;
        Ok((source, sink))
    }

    /// Breadth-first search over the residual graph
    fn find_augmenting_path(
        &self,
        source: G::Vertex,
        sink: G::Vertex,
    ) -> Result<ResidualSearch<G::Vertex, G::Edge>, AlgorithmError> {
        let residual = &self.residual;
        let epsilon = self.flow_epsilon;
        let view = FilteredGraph::new(self.graph, |edge: G::Edge| {
            residual.get(&edge).is_some_and(|&capacity| capacity > epsilon)
        });

        let mut bfs = BreadthFirstSearch::with_host(&view, &self.core);
        let predecessors = VertexPredecessorRecorder::new();
        let discovered = VertexRecorder::new();
        let _predecessors = bfs.attach(&predecessors);
        let _discovered = bfs.attach(&discovered);
        bfs.compute_between(source, sink)?;

        let search = match predecessors.path_to(self.graph, source, sink) {
            Some(path) => ResidualSearch::Path(path),
            None => ResidualSearch::Cut(discovered.vertices().iter().copied().collect()),
        };
        Ok(search)
    }

    fn augment(&mut self, path: &[G::Edge]) -> Result<f64, AlgorithmError> {
        let delta = path
            .iter()
            .map(|edge| self.residual.get(edge).copied().unwrap_or(0.0))
            .fold(f64::INFINITY, f64::min);

        for &edge in path {
            let reversed = *self
                .reversed_edges
                .get(&edge)
                .ok_or_else(|| AlgorithmError::MissingReversedEdge(describe_edge(edge)))?;
            if let Some(residual) = self.residual.get_mut(&edge) {
                *residual -= delta;
            }
            *self.residual.entry(reversed).or_insert(0.0) += delta;
        }
        Ok(delta)
    }
}

impl<'g, G, C> Algorithm for EdmondsKarpMaximumFlow<'g, G, C>
where
    G: IncidenceGraph + VertexListGraph + EdgeListGraph,
    C: Fn(G::Edge) -> f64,
{
    fn name(&self) -> &'static str {
        "EdmondsKarp"
    }

    fn category(&self) -> &'static str {
        "max-flow"
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn initialize(&mut self) -> Result<(), AlgorithmError> {
        let (source, sink) = self.endpoints()?;
        for vertex in [source, sink] {
            if !self.graph.contains_vertex(vertex) {
                return Err(AlgorithmError::InvalidVertex(format!("{vertex:?}")));
            }
        }
        if source == sink {
            return Err(AlgorithmError::InvalidVertex(format!(
                "source and sink are both {source:?}"
            )));
        }

        self.residual.clear();
        self.source_side.clear();
        self.augmentations = 0;
        self.max_flow = 0.0;

        for edge in self.graph.edges() {
            let capacity = (self.capacities)(edge);
            if capacity < 0.0 {
                return Err(AlgorithmError::NegativeCapacity {
                    edge: describe_edge(edge),
                    capacity,
                });
            }
            let is_self_loop = self.graph.source(edge) == self.graph.target(edge);
            if !is_self_loop && !self.reversed_edges.contains_key(&edge) {
                return Err(AlgorithmError::MissingReversedEdge(describe_edge(edge)));
            }
            self.residual.insert(edge, capacity);
        }
        Ok(())
    }

    fn internal_compute(&mut self) -> Result<(), AlgorithmError> {
        let (source, sink) = self.endpoints()?;

        loop {
            if self.core.is_cancelling() {
                debug!("Edmonds-Karp cancelled after {} augmentations", self.augmentations);
                break;
            }
            if self.max_augmentations.is_some_and(|limit| self.augmentations >= limit) {
                debug!("Edmonds-Karp stopped at the augmentation limit");
                break;
            }

            let search = self.find_augmenting_path(source, sink)?;
            if self.core.is_cancelling() {
                break;
            }

            match search {
                ResidualSearch::Path(path) => {
                    let delta = self.augment(&path)?;
                    self.augmentations += 1;
                    trace!("Augmented {} edges by {delta}", path.len());
                    self.augmented.raise(&Augmentation { path, delta });
                }
                ResidualSearch::Cut(reached) => {
                    self.source_side = reached;
                    break;
                }
            }
        }

        self.max_flow = self
            .graph
            .out_edges(source)
            .map(|edge| (self.capacities)(edge) - self.residual.get(&edge).copied().unwrap_or(0.0))
            .sum();
        info!(
            "Maximum flow {} after {} augmentations",
            self.max_flow, self.augmentations
        );
        Ok(())
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "flow_epsilon" => {
                let epsilon: f64 = parse_parameter(name, value)?;
                if !(epsilon >= 0.0) {
                    return Err(AlgorithmError::invalid_parameter(name, "must be a non-negative number"));
                }
                self.flow_epsilon = epsilon;
            }
            "max_augmentations" => {
                self.max_augmentations = match value.trim() {
                    "" | "none" => None,
                    limit => Some(parse_parameter(name, limit)?),
                };
            }
            _ => return Err(AlgorithmError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "flow_epsilon" => Some(self.flow_epsilon.to_string()),
            "max_augmentations" => Some(
                self.max_augmentations
                    .map_or_else(|| "none".to_owned(), |limit| limit.to_string()),
            ),
            _ => None,
        }
    }
}

impl<'g, G, C> RootedAlgorithm for EdmondsKarpMaximumFlow<'g, G, C>
where
    G: IncidenceGraph + VertexListGraph + EdgeListGraph,
    C: Fn(G::Edge) -> f64,
{
    type Root = G::Vertex;

    fn roots(&self) -> &SearchRoots<G::Vertex> {
        &self.roots
    }

    fn roots_mut(&mut self) -> &mut SearchRoots<G::Vertex> {
        &mut self.roots
    }
}

/// `compute_between(source, sink)` runs the flow from `source` to `sink`
impl<'g, G, C> SearchAlgorithm for EdmondsKarpMaximumFlow<'g, G, C>
where
    G: IncidenceGraph + VertexListGraph + EdgeListGraph,
    C: Fn(G::Edge) -> f64,
{
}

/// Augments `graph`, runs Edmonds-Karp from `source` to `sink`, and removes
/// the synthetic reverse edges again, also when the run fails
///
/// The returned flows cover the edges of the original graph only.
pub fn maximum_flow<G>(
    graph: &mut G,
    source: G::Vertex,
    sink: G::Vertex,
    capacities: impl Fn(G::Edge) -> f64,
) -> Result<MaxFlowResult<G::Vertex, G::Edge>, AlgorithmError>
where
    G: IncidenceGraph + VertexListGraph + EdgeListGraph + MutableEdgeGraph,
{
    let mut augmentor = ReversedEdgeAugmentor::new(graph);
    augmentor.add_reversed_edges()?;

    let result = {
        let synthetic = augmentor.augmented_edges();
        let capacity = |edge: G::Edge| {
            if synthetic.contains(&edge) {
                0.0
            } else {
                capacities(edge)
            }
        };

        let mut flow = EdmondsKarpMaximumFlow::new(augmentor.graph(), capacity, augmentor.reversed_edges());
        flow.compute_between(source, sink)?;
        flow.result(|edge| !synthetic.contains(&edge))
    };

    augmentor.remove_reversed_edges();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::graph::{AdjacencyGraph, EdgeId, GraphBase, VertexId};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Classic six-vertex network with maximum flow 23
    fn clrs() -> (AdjacencyGraph, Vec<f64>) {
        let graph = AdjacencyGraph::from_edges(
            6,
            &[(0, 1), (0, 2), (1, 3), (2, 1), (2, 4), (3, 2), (3, 5), (4, 3), (4, 5)],
        )
        .unwrap();
        (graph, vec![16.0, 13.0, 12.0, 4.0, 14.0, 9.0, 20.0, 7.0, 4.0])
    }

    #[test]
    fn test_maximum_flow_on_classic_network() {
        let (mut graph, capacities) = clrs();
        let result = maximum_flow(&mut graph, VertexId(0), VertexId(5), |e: EdgeId| {
            capacities.get(e.0).copied().unwrap_or(0.0)
        })
        .unwrap();

        assert_eq!(result.value, 23.0);
        assert_eq!(graph.edge_count(), 9);
        assert_eq!(result.flows.len(), 9);
        let into_sink: f64 = [EdgeId(6), EdgeId(8)].iter().map(|e| result.flows[e]).sum();
        assert_eq!(into_sink, 23.0);
        assert!(result.source_side.contains(&VertexId(0)));
        assert!(!result.source_side.contains(&VertexId(5)));
    }

    #[test]
    fn test_flow_conservation_and_non_negative_residuals() {
        let (mut graph, capacities) = clrs();
        let mut augmentor = ReversedEdgeAugmentor::new(&mut graph);
        augmentor.add_reversed_edges().unwrap();
        let synthetic = augmentor.augmented_edges().clone();
        let capacity = |e: EdgeId| if synthetic.contains(&e) { 0.0 } else { capacities[e.0] };
        let mut flow = EdmondsKarpMaximumFlow::new(augmentor.graph(), capacity, augmentor.reversed_edges());

        flow.compute_between(VertexId(0), VertexId(5)).unwrap();

        assert!(flow.residual_capacities().values().all(|&r| r >= 0.0));
        let view = augmentor.graph();
        for vertex in 1..5 {
            let balance: f64 = (0..9)
                .map(EdgeId)
                .map(|e| {
                    let f = flow.flow(e).unwrap();
                    if view.target(e) == VertexId(vertex) {
                        f
                    } else if view.source(e) == VertexId(vertex) {
                        -f
                    } else {
                        0.0
                    }
                })
                .sum();
            assert!(balance.abs() < 1e-9, "vertex {vertex} unbalanced by {balance}");
        }
    }

    #[test]
    fn test_negative_capacity_is_rejected() {
        let mut graph = AdjacencyGraph::from_edges(2, &[(0, 1)]).unwrap();
        let result = maximum_flow(&mut graph, VertexId(0), VertexId(1), |_| -1.0);

        assert!(matches!(result, Err(AlgorithmError::NegativeCapacity { .. })));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_missing_reverse_edge_is_rejected() {
        let graph = AdjacencyGraph::from_edges(2, &[(0, 1)]).unwrap();
        let reversed = HashMap::new();
        let mut flow = EdmondsKarpMaximumFlow::new(&graph, |_| 1.0, &reversed);

        let result = flow.compute_between(VertexId(0), VertexId(1));

        assert_eq!(result, Err(AlgorithmError::MissingReversedEdge("EdgeId(0)".to_owned())));
    }

    #[test]
    fn test_requires_source_and_sink() {
        let graph = AdjacencyGraph::from_edges(2, &[(0, 1)]).unwrap();
        let reversed = HashMap::new();
        let mut flow = EdmondsKarpMaximumFlow::new(&graph, |_| 1.0, &reversed);

        flow.set_source(VertexId(0));
        assert_eq!(flow.compute(), Err(AlgorithmError::MissingRootVertex));

        flow.set_sink(VertexId(0));
        assert!(matches!(flow.compute(), Err(AlgorithmError::InvalidVertex(_))));
    }

    #[test]
    fn test_disconnected_sink_has_zero_flow() {
        let mut graph = AdjacencyGraph::from_edges(4, &[(0, 1), (2, 3)]).unwrap();
        let result = maximum_flow(&mut graph, VertexId(0), VertexId(3), |_| 5.0).unwrap();

        assert_eq!(result.value, 0.0);
        assert_eq!(
            result.source_side,
            [VertexId(0), VertexId(1)].into_iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn test_augmentation_limit_and_events() {
        let (mut graph, capacities) = clrs();
        let mut augmentor = ReversedEdgeAugmentor::new(&mut graph);
        augmentor.add_reversed_edges().unwrap();
        let synthetic = augmentor.augmented_edges().clone();
        let capacity = |e: EdgeId| if synthetic.contains(&e) { 0.0 } else { capacities[e.0] };
        let mut flow = EdmondsKarpMaximumFlow::new(augmentor.graph(), capacity, augmentor.reversed_edges());
        let pushed = Rc::new(Cell::new(0.0));
        let total = Rc::clone(&pushed);
        let _a = flow.on_augmentation(move |augmentation| total.set(total.get() + augmentation.delta));

        flow.set_parameter("max_augmentations", "1").unwrap();
        flow.compute_between(VertexId(0), VertexId(5)).unwrap();
        assert_eq!(flow.augmentations(), 1);
        assert!(flow.max_flow() < 23.0);

        flow.set_parameter("max_augmentations", "none").unwrap();
        flow.compute().unwrap();
        assert_eq!(flow.max_flow(), 23.0);
        assert_eq!(pushed.get(), flow.max_flow() + 12.0);
    }

    #[test]
    fn test_parameters() {
        let graph = AdjacencyGraph::with_vertices(2);
        let reversed = HashMap::new();
        let mut flow = EdmondsKarpMaximumFlow::new(&graph, |_| 1.0, &reversed);

        flow.set_parameter("flow_epsilon", "0.5").unwrap();
        assert_eq!(flow.get_parameter("flow_epsilon").as_deref(), Some("0.5"));
        assert!(flow.set_parameter("flow_epsilon", "-1").is_err());
        assert_eq!(flow.get_parameter("max_augmentations").as_deref(), Some("none"));
        assert!(matches!(
            flow.set_parameter("capacity", "1"),
            Err(AlgorithmError::UnknownParameter(_))
        ));
    }
}
