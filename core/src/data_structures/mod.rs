//! Graph storage and the auxiliary structures the algorithms run on

pub mod graph;
pub mod observable;
pub mod priority_queue;
pub mod union_find;

pub use graph::{
    AdjacencyGraph, BidirectionalGraph, EdgeId, EdgeListGraph, FilteredGraph, GraphBase,
    IncidenceGraph, MutableEdgeGraph, MutableVertexGraph, VertexId, VertexListGraph,
};
pub use observable::{GraphChange, ObservableGraph};
pub use priority_queue::{HeapOperation, HeapOrder, HeapStats, IndexedPriorityQueue, PriorityComparable};
pub use union_find::UnionFind;
