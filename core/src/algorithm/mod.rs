//! Quiver algorithm framework
//!
//! Every algorithm shares the lifecycle in [`state`], polls the cancellation
//! service from [`cancellation`] at its safepoints and reports progress
//! through the events in [`events`], which [`observers`] turn into results.
//!
//! Copyright (c) 2025 Quiver Contributors

pub mod cancellation;
pub mod events;
pub mod graph;
pub mod observers;
pub mod path_finding;
pub mod rooted;
pub mod services;
pub mod state;
pub mod traits;
pub mod traversal;

pub use self::cancellation::{CancelManager, CancelNotice};
pub use self::events::{EdgeArgs, Event, EventKind, SearchEvent, SearchEvents, SharedEvent, Subscription};
pub use self::graph::*;
pub use self::observers::{
    Detacher, EdgeRecorder, Observable, Observer, SearchProfile, SearchProfiler,
    VertexDistanceRecorder, VertexPredecessorRecorder, VertexRecorder, VertexTimeStamper,
};
pub use self::path_finding::*;
pub use self::rooted::{RootedAlgorithm, SearchAlgorithm, SearchRoots};
pub use self::services::ServiceRegistry;
pub use self::state::{AbortHandle, AlgorithmCore, ComputationGuard, ComputationState, LifecycleEvent};
pub use self::traits::{Algorithm, AlgorithmError};
pub use self::traversal::{
    BreadthFirstSearch, DepthFirstSearch, TopologicalSort, VertexColor, VisitOutcome,
};
