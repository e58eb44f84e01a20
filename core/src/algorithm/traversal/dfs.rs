//! Depth-first search
//!
//! Iterative, so deep graphs do not exhaust the call stack. The root (if any)
//! is visited first, then every remaining white vertex in enumeration order.
//! Edges are classified as tree, back (target gray) or forward-or-cross
//! (target black).

use log::debug;

use crate::algorithm::events::{EdgeArgs, SearchEvent, SearchEvents};
use crate::algorithm::observers::Observable;
use crate::algorithm::rooted::{RootedAlgorithm, SearchRoots};
use crate::algorithm::state::AlgorithmCore;
use crate::algorithm::traits::{parse_parameter, Algorithm, AlgorithmError};
use crate::algorithm::traversal::VertexColor;
use crate::data_structures::graph::{IncidenceGraph, VertexListGraph};

struct Frame<V, E> {
    vertex: V,
    edges: Vec<E>,
    next: usize,
}

pub struct DepthFirstSearch<'g, G: IncidenceGraph + VertexListGraph> {
    core: AlgorithmCore,
    graph: &'g G,
    roots: SearchRoots<G::Vertex>,
    events: SearchEvents<G::Vertex, G::Edge>,
    colors: Vec<VertexColor>,
    max_depth: usize,
}

impl<'g, G: IncidenceGraph + VertexListGraph> DepthFirstSearch<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self::with_core(graph, AlgorithmCore::new())
    }

    pub fn with_host(graph: &'g G, host: &AlgorithmCore) -> Self {
        Self::with_core(graph, AlgorithmCore::with_host(host))
    }

    fn with_core(graph: &'g G, core: AlgorithmCore) -> Self {
        Self {
            core,
            graph,
            roots: SearchRoots::new(),
            events: SearchEvents::new(),
            colors: Vec::new(),
            max_depth: usize::MAX,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Vertices deeper than `max_depth` tree edges stay undiscovered
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    fn frame(&self, vertex: G::Vertex) -> Frame<G::Vertex, G::Edge> {
        Frame {
            vertex,
            edges: self.graph.out_edges(vertex).collect(),
            next: 0,
        }
    }

    /// Returns `false` when cancelled
    fn visit(&mut self, root: G::Vertex) -> bool {
        let cancel = self.core.cancel_manager();

        self.events.raise(&SearchEvent::StartVertex(root));
        self.colors[self.graph.vertex_index(root)] = VertexColor::Gray;
        self.events.raise(&SearchEvent::DiscoverVertex(root));
        let mut stack = vec![self.frame(root)];

        while let Some(top) = stack.last_mut() {
            if cancel.is_cancelling() {
                return false;
            }

            let source = top.vertex;
            let Some(&edge) = top.edges.get(top.next) else {
                self.colors[self.graph.vertex_index(source)] = VertexColor::Black;
                self.events.raise(&SearchEvent::FinishVertex(source));
                stack.pop();
                continue;
            };
            top.next += 1;

            let target = self.graph.target(edge);
            let target_index = self.graph.vertex_index(target);
            let args = EdgeArgs {
                edge,
                source,
                target,
            };
            self.events.raise(&SearchEvent::ExamineEdge(args));

            match self.colors[target_index] {
                VertexColor::White => {
                    if stack.len() > self.max_depth {
                        continue;
                    }
                    self.events.raise(&SearchEvent::TreeEdge(args));
                    self.colors[target_index] = VertexColor::Gray;
                    self.events.raise(&SearchEvent::DiscoverVertex(target));
                    stack.push(self.frame(target));
                }
                VertexColor::Gray => self.events.raise(&SearchEvent::BackEdge(args)),
                VertexColor::Black => self.events.raise(&SearchEvent::ForwardOrCrossEdge(args)),
            }
        }
        true
    }
}

impl<'g, G: IncidenceGraph + VertexListGraph> Algorithm for DepthFirstSearch<'g, G> {
    fn name(&self) -> &'static str {
        "DepthFirstSearch"
    }

    fn category(&self) -> &'static str {
        "traversal"
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn initialize(&mut self) -> Result<(), AlgorithmError> {
        if let Some(root) = self.roots.root() {
            if !self.graph.contains_vertex(root) {
                return Err(AlgorithmError::InvalidVertex(format!("{root:?}")));
            }
        }

        self.colors = vec![VertexColor::White; self.graph.vertex_bound()];
        for vertex in self.graph.vertices() {
            self.events.raise(&SearchEvent::InitializeVertex(vertex));
        }
        Ok(())
    }

    fn internal_compute(&mut self) -> Result<(), AlgorithmError> {
        let graph = self.graph;
        let starts = self.roots.root().into_iter().chain(graph.vertices());

        for vertex in starts {
            if self.core.is_cancelling() {
                debug!("{} cancelled", self.name());
                return Ok(());
            }
            if self.colors[graph.vertex_index(vertex)] != VertexColor::White {
                continue;
            }
            if !self.visit(vertex) {
                debug!("{} cancelled", self.name());
                return Ok(());
            }
        }
        Ok(())
    }

    fn clean(&mut self) {
        self.colors = Vec::new();
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "max_depth" => {
                self.max_depth = parse_parameter(name, value)?;
                Ok(())
            }
            _ => Err(AlgorithmError::UnknownParameter(name.to_owned())),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "max_depth" => Some(self.max_depth.to_string()),
            _ => None,
        }
    }
}

impl<'g, G: IncidenceGraph + VertexListGraph> RootedAlgorithm for DepthFirstSearch<'g, G> {
    type Root = G::Vertex;

    fn roots(&self) -> &SearchRoots<G::Vertex> {
        &self.roots
    }

    fn roots_mut(&mut self) -> &mut SearchRoots<G::Vertex> {
        &mut self.roots
    }
}

impl<'g, G: IncidenceGraph + VertexListGraph> Observable for DepthFirstSearch<'g, G> {
    type Vertex = G::Vertex;
    type Edge = G::Edge;

    fn search_events(&self) -> &SearchEvents<G::Vertex, G::Edge> {
        &self.events
    }
}
