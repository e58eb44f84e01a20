//! Core algorithm trait definitions
//!
//! Every algorithm in the crate implements [`Algorithm`]. The trait provides
//! the `compute` template (begin computation, initialize, run, clean, end
//! computation) on top of an [`AlgorithmCore`] that owns the lifecycle state
//! machine and the service registry.
//!
//! Copyright (c) 2025 Quiver Contributors

use crate::algorithm::state::{AbortHandle, AlgorithmCore, ComputationState};

/// Comprehensive error types for algorithm operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlgorithmError {
    #[error("Computation already running")]
    AlreadyRunning,

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidStateTransition {
        from: ComputationState,
        to: ComputationState,
    },

    #[error("Root vertex not set")]
    MissingRootVertex,

    #[error("Invalid vertex: {0}")]
    InvalidVertex(String),

    #[error("Negative weight {weight} on edge {edge}")]
    NegativeEdgeWeight { edge: String, weight: f64 },

    #[error("Negative capacity {capacity} on edge {edge}")]
    NegativeCapacity { edge: String, capacity: f64 },

    #[error("No reversed edge for {0}")]
    MissingReversedEdge(String),

    #[error("Graph is already augmented")]
    AlreadyAugmented,

    #[error("Graph is not acyclic")]
    NonAcyclicGraph,

    #[error("Graph is borrowed by another operation")]
    GraphBorrowed,

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Element {0} not in queue")]
    ElementNotFound(usize),

    #[error("Priority update for element {0} violates heap order")]
    InvalidPriorityUpdate(usize),

    #[error("Heap invariant violated between positions {0} and {1}")]
    HeapInvariantViolation(usize, usize),
}

impl AlgorithmError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Main algorithm trait
///
/// Implementors supply `core`, `internal_compute` and, when they keep per-run
/// state, `initialize` and `clean`. `compute` must not be overridden: it is
/// the only place that drives the lifecycle state machine.
///
/// # Invariants
/// - At most one computation is in flight per instance.
/// - `clean` runs after every computation that got past `begin`, whether
///   `initialize` or `internal_compute` succeeded or not.
pub trait Algorithm {
    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category (e.g., traversal, shortest-path)
    fn category(&self) -> &'static str;

    /// Lifecycle and services shared with any hosted sub-computations
    fn core(&self) -> &AlgorithmCore;

    /// Builds fresh per-run state
    fn initialize(&mut self) -> Result<(), AlgorithmError> {
        Ok(())
    }

    /// Algorithm body. Returns early without error when cancellation is
    /// observed at a safepoint.
    fn internal_compute(&mut self) -> Result<(), AlgorithmError>;

    /// Releases per-run state that is not part of the result
    fn clean(&mut self) {}

    /// Runs one computation to completion, failure or abortion
    fn compute(&mut self) -> Result<(), AlgorithmError> {
        let core = self.core().clone();
        let guard = core.begin_computation()?;

        let outcome = self.initialize().and_then(|()| self.internal_compute());
        self.clean();

        guard.finish()?;
        outcome
    }

    fn state(&self) -> ComputationState {
        self.core().state()
    }

    /// Requests cancellation of the running computation
    fn abort(&self) {
        self.core().abort();
    }

    /// Thread-safe handle for aborting from elsewhere
    fn abort_handle(&self) -> AbortHandle {
        self.core().abort_handle()
    }

    fn is_cancelling(&self) -> bool {
        self.core().is_cancelling()
    }

    /// Sets algorithm parameter with validation
    fn set_parameter(&mut self, name: &str, _value: &str) -> Result<(), AlgorithmError> {
        Err(AlgorithmError::UnknownParameter(name.to_owned()))
    }

    /// Gets algorithm parameter value
    fn get_parameter(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Parses a parameter value, mapping failures to `InvalidParameter`
pub(crate) fn parse_parameter<T>(name: &str, value: &str) -> Result<T, AlgorithmError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err: T::Err| AlgorithmError::invalid_parameter(name, err.to_string()))
}
