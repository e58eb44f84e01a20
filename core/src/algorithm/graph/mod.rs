//! Flow, spanning tree and connectivity algorithms
//! Copyright (c) 2025 Quiver Contributors

pub mod augmentor;
pub mod components;
pub mod max_flow;
pub mod mst;

pub use self::augmentor::ReversedEdgeAugmentor;
pub use self::components::{ConnectedComponents, IncrementalConnectedComponents};
pub use self::max_flow::{maximum_flow, Augmentation, EdmondsKarpMaximumFlow, MaxFlowResult};
pub use self::mst::KruskalMinimumSpanningTree;
