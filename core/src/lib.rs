//! Quiver core
//!
//! Generic graph algorithms on a shared execution framework. Each algorithm
//! runs through one lifecycle (`NotRunning -> Running -> Finished | Aborted`),
//! can be cancelled cooperatively from another thread through an
//! [`AbortHandle`](algorithm::AbortHandle), and reports its progress as
//! events that observers turn into predecessor maps, distances or timings.
//!
//! Algorithms are generic over the graph capability traits in
//! [`data_structures::graph`]; [`AdjacencyGraph`](data_structures::AdjacencyGraph)
//! is the in-crate implementation.
//!
//! Copyright (c) 2025 Quiver Contributors

pub mod algorithm;
pub mod config;
pub mod data_structures;

pub mod prelude {
    pub use crate::algorithm::{
        maximum_flow, AStarShortestPath, AbortHandle, Algorithm, AlgorithmCore, AlgorithmError,
        BellmanFordShortestPath, BreadthFirstSearch, ComputationState, ConnectedComponents,
        DagShortestPath, DepthFirstSearch, DijkstraShortestPath, EdmondsKarpMaximumFlow,
        EventKind, IncrementalConnectedComponents, KruskalMinimumSpanningTree, MaxFlowResult,
        Observable, Observer,
        ReversedEdgeAugmentor, RootedAlgorithm, SearchAlgorithm, SearchEvent,
        ShortestPathAlgorithm, StandardRelaxer, TopologicalSort, VertexDistanceRecorder,
        VertexPredecessorRecorder,
    };
    pub use crate::config::AlgorithmConfig;
    pub use crate::data_structures::graph::{
        AdjacencyGraph, BidirectionalGraph, EdgeId, EdgeListGraph, GraphBase, IncidenceGraph,
        MutableEdgeGraph, MutableVertexGraph, VertexId, VertexListGraph,
    };
    pub use crate::data_structures::observable::{GraphChange, ObservableGraph};
}
