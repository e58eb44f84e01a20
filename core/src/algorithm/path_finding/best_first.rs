//! Best-first relaxation shared by Dijkstra and A*
//!
//! The breadth-first engine supplies the traversal; this visitor relaxes the
//! edges it reports and keys the priority frontier by distance (plus the
//! heuristic estimate when one is given).

use std::iter;

use crate::algorithm::cancellation::CancelManager;
use crate::algorithm::events::{EdgeArgs, SearchEvent, SearchEvents};
use crate::algorithm::path_finding::describe_edge;
use crate::algorithm::path_finding::relaxer::{relax, DistanceRelaxer};
use crate::algorithm::traits::AlgorithmError;
use crate::algorithm::traversal::{
    breadth_first_visit, BfsVisitor, PriorityFrontier, VertexColor, VisitOutcome,
};
use crate::data_structures::graph::{IncidenceGraph, VertexListGraph};

pub(crate) struct BestFirstSearch<'a, G: IncidenceGraph + VertexListGraph, W> {
    pub graph: &'a G,
    pub weights: &'a W,
    pub relaxer: &'a dyn DistanceRelaxer,
    pub distances: &'a mut [f64],
    pub heuristic: Option<&'a dyn Fn(G::Vertex) -> f64>,
    /// Re-open finished vertices whose distance improves
    pub reopen_closed: bool,
    pub events: &'a SearchEvents<G::Vertex, G::Edge>,
    pub goal: Option<G::Vertex>,
}

impl<'a, G, W> BestFirstSearch<'a, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    /// Runs from `root`, or from every white vertex in enumeration order
    pub fn run(
        mut self,
        root: Option<G::Vertex>,
        cancel: &CancelManager,
    ) -> Result<VisitOutcome, AlgorithmError> {
        let graph = self.graph;
        let bound = graph.vertex_bound();
        let mut colors = vec![VertexColor::White; bound];
        let mut frontier = PriorityFrontier::new(bound);

        match root {
            Some(root) => breadth_first_visit(
                graph,
                iter::once(root),
                &mut colors,
                &mut frontier,
                &mut self,
                cancel,
            ),
            None => breadth_first_visit(
                graph,
                graph.vertices(),
                &mut colors,
                &mut frontier,
                &mut self,
                cancel,
            ),
        }
    }

    fn relax_edge(&mut self, args: EdgeArgs<G::Vertex, G::Edge>) -> bool {
        relax(
            self.relaxer,
            self.distances,
            self.graph.vertex_index(args.source),
            self.graph.vertex_index(args.target),
            (self.weights)(args.edge),
        )
    }

    /// Raises `TreeEdge` or `EdgeNotRelaxed` for a relaxation attempt
    fn relax_and_report(&mut self, args: EdgeArgs<G::Vertex, G::Edge>) -> bool {
        let relaxed = self.relax_edge(args);
        if relaxed {
            self.events.raise(&SearchEvent::TreeEdge(args));
        } else {
            self.events.raise(&SearchEvent::EdgeNotRelaxed(args));
        }
        relaxed
    }
}

impl<'a, G, W> BfsVisitor<G::Vertex, G::Edge> for BestFirstSearch<'a, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    fn start_vertex(&mut self, vertex: G::Vertex) -> Result<(), AlgorithmError> {
        self.distances[self.graph.vertex_index(vertex)] = self.relaxer.source_distance();
        self.events.raise(&SearchEvent::StartVertex(vertex));
        Ok(())
    }

    fn discover_vertex(&mut self, vertex: G::Vertex) -> Result<(), AlgorithmError> {
        self.events.raise(&SearchEvent::DiscoverVertex(vertex));
        Ok(())
    }

    fn examine_vertex(&mut self, vertex: G::Vertex) -> Result<(), AlgorithmError> {
        self.events.raise(&SearchEvent::ExamineVertex(vertex));
        Ok(())
    }

    fn examine_edge(&mut self, args: EdgeArgs<G::Vertex, G::Edge>) -> Result<(), AlgorithmError> {
        let weight = (self.weights)(args.edge);
        if !(weight >= 0.0) {
            return Err(AlgorithmError::NegativeEdgeWeight {
                edge: describe_edge(args.edge),
                weight,
            });
        }
        self.events.raise(&SearchEvent::ExamineEdge(args));
        Ok(())
    }

    /// A target the edge cannot reach, such as over an infinite weight,
    /// stays undiscovered
    fn tree_edge(&mut self, args: EdgeArgs<G::Vertex, G::Edge>) -> Result<bool, AlgorithmError> {
        Ok(self.relax_and_report(args))
    }

    /// A self-loop never improves the vertex being examined
    fn gray_target(&mut self, args: EdgeArgs<G::Vertex, G::Edge>) -> Result<bool, AlgorithmError> {
        if args.source == args.target {
            self.events.raise(&SearchEvent::EdgeNotRelaxed(args));
            return Ok(false);
        }
        Ok(self.relax_and_report(args))
    }

    fn black_target(&mut self, args: EdgeArgs<G::Vertex, G::Edge>) -> Result<bool, AlgorithmError> {
        if !self.reopen_closed {
            return Ok(false);
        }
        Ok(self.relax_and_report(args))
    }

    fn finish_vertex(&mut self, vertex: G::Vertex) -> Result<(), AlgorithmError> {
        self.events.raise(&SearchEvent::FinishVertex(vertex));
        Ok(())
    }

    fn priority(&self, vertex: G::Vertex, index: usize) -> f64 {
        let distance = self.distances[index];
        let cost = match self.heuristic {
            Some(heuristic) => self.relaxer.combine(distance, heuristic(vertex)),
            None => distance,
        };
        self.relaxer.queue_key(cost)
    }

    fn should_stop(&mut self, vertex: G::Vertex) -> bool {
        if self.goal == Some(vertex) {
            self.events.raise(&SearchEvent::TargetReached(vertex));
            return true;
        }
        false
    }
}
