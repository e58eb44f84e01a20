//! Shortest paths on a directed acyclic graph
//!
//! # Algorithmic Complexity
//! - Time: O(V + E)
//! - Space: O(V)
//!
//! Vertices are taken in topological order and each out-edge is relaxed
//! exactly once. A cycle makes the topological sort fail with
//! [`AlgorithmError::NonAcyclicGraph`], which propagates unchanged. Negative
//! weights are allowed; with the critical relaxer this computes longest
//! (critical) paths.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::algorithm::events::{EdgeArgs, SearchEvent, SearchEvents};
use crate::algorithm::observers::Observable;
use crate::algorithm::path_finding::relaxer::{relax, DistanceRelaxer, ShortestDistanceRelaxer};
use crate::algorithm::path_finding::{relaxer_parameter, DistanceTable, ShortestPathAlgorithm};
use crate::algorithm::rooted::{RootedAlgorithm, SearchRoots};
use crate::algorithm::state::AlgorithmCore;
use crate::algorithm::traits::{Algorithm, AlgorithmError};
use crate::algorithm::traversal::TopologicalSort;
use crate::data_structures::graph::{IncidenceGraph, VertexListGraph};

pub struct DagShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    core: AlgorithmCore,
    graph: &'g G,
    weights: W,
    relaxer: Rc<dyn DistanceRelaxer>,
    roots: SearchRoots<G::Vertex>,
    events: SearchEvents<G::Vertex, G::Edge>,
    distances: DistanceTable,
}

impl<'g, G, W> DagShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    pub fn new(graph: &'g G, weights: W) -> Self {
        Self::with_relaxer(graph, weights, Rc::new(ShortestDistanceRelaxer))
    }

    pub fn with_relaxer(graph: &'g G, weights: W, relaxer: Rc<dyn DistanceRelaxer>) -> Self {
        Self {
            core: AlgorithmCore::new(),
            graph,
            weights,
            relaxer,
            roots: SearchRoots::new(),
            events: SearchEvents::new(),
            distances: DistanceTable::new(),
        }
    }
}

impl<'g, G, W> Algorithm for DagShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    fn name(&self) -> &'static str {
        "DagShortestPath"
    }

    fn category(&self) -> &'static str {
        "shortest-path"
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn initialize(&mut self) -> Result<(), AlgorithmError> {
        let root = self.roots.require_root()?;
        if !self.graph.contains_vertex(root) {
            return Err(AlgorithmError::InvalidVertex(format!("{root:?}")));
        }

        self.distances
            .reset(self.graph.vertex_bound(), self.relaxer.initial_distance());
        for vertex in self.graph.vertices() {
            self.events.raise(&SearchEvent::InitializeVertex(vertex));
        }
        Ok(())
    }

    fn internal_compute(&mut self) -> Result<(), AlgorithmError> {
        let root = self.roots.require_root()?;

        let mut sort = TopologicalSort::with_host(self.graph, &self.core);
        sort.compute()?;
        if self.core.is_cancelling() {
            return Ok(());
        }

        let root_index = self.graph.vertex_index(root);
        self.distances.set(root_index, self.relaxer.source_distance());
        self.events.raise(&SearchEvent::StartVertex(root));

        for vertex in sort.into_sorted_vertices() {
            if self.core.is_cancelling() {
                debug!("DAG shortest path cancelled");
                return Ok(());
            }

            self.events.raise(&SearchEvent::ExamineVertex(vertex));
            for edge in self.graph.out_edges(vertex) {
                let args = EdgeArgs {
                    edge,
                    source: vertex,
                    target: self.graph.target(edge),
                };
                self.events.raise(&SearchEvent::ExamineEdge(args));

                let relaxed = relax(
                    &*self.relaxer,
                    self.distances.as_mut_slice(),
                    self.graph.vertex_index(vertex),
                    self.graph.vertex_index(args.target),
                    (self.weights)(edge),
                );
                if relaxed {
                    self.events.raise(&SearchEvent::TreeEdge(args));
                } else {
                    self.events.raise(&SearchEvent::EdgeNotRelaxed(args));
                }
            }
            self.events.raise(&SearchEvent::FinishVertex(vertex));
        }
        Ok(())
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "relaxer" => {
                self.relaxer = relaxer_parameter(value)?;
                Ok(())
            }
            _ => Err(AlgorithmError::UnknownParameter(name.to_owned())),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "relaxer" => Some(self.relaxer.name().to_owned()),
            _ => None,
        }
    }
}

impl<'g, G, W> RootedAlgorithm for DagShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    type Root = G::Vertex;

    fn roots(&self) -> &SearchRoots<G::Vertex> {
        &self.roots
    }

    fn roots_mut(&mut self) -> &mut SearchRoots<G::Vertex> {
        &mut self.roots
    }
}

impl<'g, G, W> ShortestPathAlgorithm for DagShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    fn relaxer(&self) -> Rc<dyn DistanceRelaxer> {
        Rc::clone(&self.relaxer)
    }

    fn set_relaxer(&mut self, relaxer: Rc<dyn DistanceRelaxer>) {
        self.relaxer = relaxer;
    }

    fn distance(&self, vertex: G::Vertex) -> Option<f64> {
        self.distances.distance_of(self.graph, vertex)
    }

    fn distances(&self) -> HashMap<G::Vertex, f64> {
        self.distances.collect(self.graph)
    }
}

impl<'g, G, W> Observable for DagShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    type Vertex = G::Vertex;
    type Edge = G::Edge;

    fn search_events(&self) -> &SearchEvents<G::Vertex, G::Edge> {
        &self.events
    }
}
