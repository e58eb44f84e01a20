//! Topological sort on top of depth-first search
//!
//! Vertices are emitted in reverse finish order. A back edge means the graph
//! has a cycle and the sort fails with [`AlgorithmError::NonAcyclicGraph`].

use crate::algorithm::events::EventKind;
use crate::algorithm::observers::{EdgeRecorder, Observable, VertexRecorder};
use crate::algorithm::state::AlgorithmCore;
use crate::algorithm::traits::{Algorithm, AlgorithmError};
use crate::algorithm::traversal::dfs::DepthFirstSearch;
use crate::data_structures::graph::{IncidenceGraph, VertexListGraph};

pub struct TopologicalSort<'g, G: IncidenceGraph + VertexListGraph> {
    core: AlgorithmCore,
    graph: &'g G,
    sorted: Vec<G::Vertex>,
}

impl<'g, G: IncidenceGraph + VertexListGraph> TopologicalSort<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            core: AlgorithmCore::new(),
            graph,
            sorted: Vec::new(),
        }
    }

    pub fn with_host(graph: &'g G, host: &AlgorithmCore) -> Self {
        Self {
            core: AlgorithmCore::with_host(host),
            graph,
            sorted: Vec::new(),
        }
    }

    /// Vertices such that every edge points forward
    pub fn sorted_vertices(&self) -> &[G::Vertex] {
        &self.sorted
    }

    pub fn into_sorted_vertices(self) -> Vec<G::Vertex> {
        self.sorted
    }
}

impl<'g, G: IncidenceGraph + VertexListGraph> Algorithm for TopologicalSort<'g, G> {
    fn name(&self) -> &'static str {
        "TopologicalSort"
    }

    fn category(&self) -> &'static str {
        "traversal"
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn initialize(&mut self) -> Result<(), AlgorithmError> {
        self.sorted.clear();
        Ok(())
    }

    fn internal_compute(&mut self) -> Result<(), AlgorithmError> {
        let mut dfs = DepthFirstSearch::with_host(self.graph, &self.core);
        let finished = VertexRecorder::for_kind(EventKind::FinishVertex);
        let back_edges = EdgeRecorder::<G::Edge>::for_kind(EventKind::BackEdge);
        let _finished = dfs.attach(&finished);
        let _back_edges = dfs.attach(&back_edges);

        dfs.compute()?;

        if !back_edges.is_empty() {
            return Err(AlgorithmError::NonAcyclicGraph);
        }
        if self.core.is_cancelling() {
            return Ok(());
        }

        self.sorted = finished.vertices().iter().rev().copied().collect();
        Ok(())
    }
}
