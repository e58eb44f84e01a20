//! Observers: event listeners that derive results from running algorithms
//!
//! An observer subscribes to the subset of [`SearchEvent`]s it cares about
//! and writes into maps it shares with the caller. Attaching returns a
//! [`Detacher`]; dropping it unsubscribes every handler, so attach and detach
//! stay symmetric on early return or error. Several observers can listen to
//! one algorithm at the same time.
//!
//! ```ignore
//! let predecessors = VertexPredecessorRecorder::new();
//! let _attached = dijkstra.attach(&predecessors);
//! dijkstra.compute_from(root)?;
//! let path = predecessors.path_to(&graph, root, goal);
//! ```

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::algorithm::events::{EventKind, SearchEvent, SearchEvents, Subscription};
use crate::algorithm::path_finding::relaxer::DistanceRelaxer;
use crate::data_structures::graph::GraphBase;

/// Algorithms exposing a search event channel
pub trait Observable {
    type Vertex: Copy + Eq + Hash + Debug + 'static;
    type Edge: Copy + Eq + Hash + Debug + 'static;

    fn search_events(&self) -> &SearchEvents<Self::Vertex, Self::Edge>;

    /// Attaches an observer for as long as the returned guard lives
    fn attach<O>(&self, observer: &O) -> Detacher
    where
        O: Observer<Self::Vertex, Self::Edge>,
        Self: Sized,
    {
        observer.attach(self.search_events())
    }
}

pub trait Observer<V, E> {
    fn attach(&self, events: &SearchEvents<V, E>) -> Detacher;
}

/// Scoped attachment of one observer
#[must_use = "dropping the detacher detaches the observer"]
#[derive(Debug, Default)]
pub struct Detacher {
    subscriptions: Vec<Subscription>,
}

impl Detacher {
    pub fn new(subscriptions: Vec<Subscription>) -> Self {
        Self { subscriptions }
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Merges another attachment into this one
    pub fn join(mut self, other: Detacher) -> Self {
        self.subscriptions.extend(other.subscriptions);
        self
    }

    pub fn detach(self) {
        drop(self);
    }
}

fn on_kind<V, E>(
    events: &SearchEvents<V, E>,
    kind: EventKind,
    mut handler: impl FnMut(&SearchEvent<V, E>) + 'static,
) -> Subscription
where
    V: Copy + 'static,
    E: Copy + 'static,
{
    events.subscribe(move |event| {
        if event.kind() == kind {
            handler(event);
        }
    })
}

/// Records the tree edge that last reached each vertex
#[derive(Debug, Clone)]
pub struct VertexPredecessorRecorder<V, E> {
    predecessors: Rc<RefCell<HashMap<V, E>>>,
}

impl<V, E> VertexPredecessorRecorder<V, E>
where
    V: Copy + Eq + Hash + 'static,
    E: Copy + 'static,
{
    pub fn new() -> Self {
        Self::with_map(Rc::new(RefCell::new(HashMap::new())))
    }

    /// Records into a caller-owned map
    pub fn with_map(predecessors: Rc<RefCell<HashMap<V, E>>>) -> Self {
        Self { predecessors }
    }

    pub fn predecessors(&self) -> Ref<'_, HashMap<V, E>> {
        self.predecessors.borrow()
    }

    pub fn predecessor(&self, vertex: V) -> Option<E> {
        self.predecessors.borrow().get(&vertex).copied()
    }

    pub fn into_map(self) -> HashMap<V, E> {
        match Rc::try_unwrap(self.predecessors) {
            Ok(cell) => cell.into_inner(),
            Err(shared) => shared.borrow().clone(),
        }
    }

    pub fn clear(&self) {
        self.predecessors.borrow_mut().clear();
    }

    /// Edge sequence from `root` to `target` along recorded predecessors
    ///
    /// `Some(vec![])` when `target == root`, `None` when `target` was not
    /// reached from `root`.
    pub fn path_to<G>(&self, graph: &G, root: V, target: V) -> Option<Vec<E>>
    where
        G: GraphBase<Vertex = V, Edge = E>,
    {
        let predecessors = self.predecessors.borrow();
        let mut path = Vec::new();
        let mut current = target;

        while current != root {
            if path.len() > predecessors.len() {
                return None;
            }
            let edge = *predecessors.get(&current)?;
            path.push(edge);
            current = graph.source(edge);
        }

        path.reverse();
        Some(path)
    }
}

impl<V, E> Default for VertexPredecessorRecorder<V, E>
where
    V: Copy + Eq + Hash + 'static,
    E: Copy + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Observer<V, E> for VertexPredecessorRecorder<V, E>
where
    V: Copy + Eq + Hash + 'static,
    E: Copy + 'static,
{
    fn attach(&self, events: &SearchEvents<V, E>) -> Detacher {
        let predecessors = Rc::clone(&self.predecessors);
        Detacher::new(vec![on_kind(events, EventKind::TreeEdge, move |event| {
            if let Some(args) = event.edge() {
                predecessors.borrow_mut().insert(args.target, args.edge);
            }
        })])
    }
}

/// Derives distances from start-vertex and tree-edge events
pub struct VertexDistanceRecorder<V, E> {
    relaxer: Rc<dyn DistanceRelaxer>,
    weights: Rc<dyn Fn(E) -> f64>,
    distances: Rc<RefCell<HashMap<V, f64>>>,
}

impl<V, E> VertexDistanceRecorder<V, E>
where
    V: Copy + Eq + Hash + 'static,
    E: Copy + 'static,
{
    pub fn new(relaxer: Rc<dyn DistanceRelaxer>, weights: impl Fn(E) -> f64 + 'static) -> Self {
        Self {
            relaxer,
            weights: Rc::new(weights),
            distances: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn distances(&self) -> Ref<'_, HashMap<V, f64>> {
        self.distances.borrow()
    }

    pub fn distance(&self, vertex: V) -> Option<f64> {
        self.distances.borrow().get(&vertex).copied()
    }
}

impl<V, E> Observer<V, E> for VertexDistanceRecorder<V, E>
where
    V: Copy + Eq + Hash + 'static,
    E: Copy + 'static,
{
    fn attach(&self, events: &SearchEvents<V, E>) -> Detacher {
        let relaxer = Rc::clone(&self.relaxer);
        let weights = Rc::clone(&self.weights);
        let distances = Rc::clone(&self.distances);

        Detacher::new(vec![events.subscribe(move |event| match *event {
            SearchEvent::StartVertex(vertex) => {
                distances
                    .borrow_mut()
                    .insert(vertex, relaxer.source_distance());
            }
            SearchEvent::TreeEdge(args) => {
                let mut distances = distances.borrow_mut();
                let base = distances
                    .get(&args.source)
                    .copied()
                    .unwrap_or_else(|| relaxer.initial_distance());
                distances.insert(args.target, relaxer.combine(base, weights(args.edge)));
            }
            _ => {}
        })])
    }
}

/// Discover and finish timestamps from a single shared clock
#[derive(Debug, Clone, Default)]
pub struct VertexTimeStamper<V> {
    discover_times: Rc<RefCell<HashMap<V, u64>>>,
    finish_times: Rc<RefCell<HashMap<V, u64>>>,
    clock: Rc<Cell<u64>>,
}

impl<V: Copy + Eq + Hash + 'static> VertexTimeStamper<V> {
    pub fn new() -> Self {
        Self {
            discover_times: Rc::default(),
            finish_times: Rc::default(),
            clock: Rc::default(),
        }
    }

    pub fn discover_time(&self, vertex: V) -> Option<u64> {
        self.discover_times.borrow().get(&vertex).copied()
    }

    pub fn finish_time(&self, vertex: V) -> Option<u64> {
        self.finish_times.borrow().get(&vertex).copied()
    }

    pub fn discover_times(&self) -> Ref<'_, HashMap<V, u64>> {
        self.discover_times.borrow()
    }

    pub fn finish_times(&self) -> Ref<'_, HashMap<V, u64>> {
        self.finish_times.borrow()
    }
}

impl<V, E> Observer<V, E> for VertexTimeStamper<V>
where
    V: Copy + Eq + Hash + 'static,
    E: Copy + 'static,
{
    fn attach(&self, events: &SearchEvents<V, E>) -> Detacher {
        let discover_times = Rc::clone(&self.discover_times);
        let finish_times = Rc::clone(&self.finish_times);
        let clock = Rc::clone(&self.clock);

        Detacher::new(vec![events.subscribe(move |event| {
            let times = match event {
                SearchEvent::DiscoverVertex(_) => &discover_times,
                SearchEvent::FinishVertex(_) => &finish_times,
                _ => return,
            };
            if let Some(vertex) = event.vertex() {
                let now = clock.get();
                clock.set(now + 1);
                times.borrow_mut().insert(vertex, now);
            }
        })])
    }
}

/// Collects the edges of one event kind, in event order
#[derive(Debug, Clone)]
pub struct EdgeRecorder<E> {
    kind: EventKind,
    edges: Rc<RefCell<Vec<E>>>,
}

impl<E: Copy + 'static> EdgeRecorder<E> {
    /// Records tree edges
    pub fn new() -> Self {
        Self::for_kind(EventKind::TreeEdge)
    }

    pub fn for_kind(kind: EventKind) -> Self {
        Self {
            kind,
            edges: Rc::default(),
        }
    }

    pub fn edges(&self) -> Ref<'_, Vec<E>> {
        self.edges.borrow()
    }

    pub fn len(&self) -> usize {
        self.edges.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Copy + 'static> Default for EdgeRecorder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Observer<V, E> for EdgeRecorder<E>
where
    V: Copy + 'static,
    E: Copy + 'static,
{
    fn attach(&self, events: &SearchEvents<V, E>) -> Detacher {
        let edges = Rc::clone(&self.edges);
        Detacher::new(vec![on_kind(events, self.kind, move |event| {
            if let Some(args) = event.edge() {
                edges.borrow_mut().push(args.edge);
            }
        })])
    }
}

/// Collects the vertices of one event kind, in event order
#[derive(Debug, Clone)]
pub struct VertexRecorder<V> {
    kind: EventKind,
    vertices: Rc<RefCell<Vec<V>>>,
}

impl<V: Copy + 'static> VertexRecorder<V> {
    /// Records discovered vertices
    pub fn new() -> Self {
        Self::for_kind(EventKind::DiscoverVertex)
    }

    pub fn for_kind(kind: EventKind) -> Self {
        Self {
            kind,
            vertices: Rc::default(),
        }
    }

    pub fn vertices(&self) -> Ref<'_, Vec<V>> {
        self.vertices.borrow()
    }

    pub fn clear(&self) {
        self.vertices.borrow_mut().clear();
    }
}

impl<V: Copy + 'static> Default for VertexRecorder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Observer<V, E> for VertexRecorder<V>
where
    V: Copy + 'static,
    E: Copy + 'static,
{
    fn attach(&self, events: &SearchEvents<V, E>) -> Detacher {
        let vertices = Rc::clone(&self.vertices);
        Detacher::new(vec![on_kind(events, self.kind, move |event| {
            if let Some(vertex) = event.vertex() {
                vertices.borrow_mut().push(vertex);
            }
        })])
    }
}

/// Snapshot of a [`SearchProfiler`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SearchProfile {
    pub vertices_discovered: usize,
    pub vertices_examined: usize,
    pub edges_examined: usize,
    pub tree_edges: usize,
    pub edges_not_relaxed: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct ProfileData {
    profile: SearchProfile,
    started: Option<Instant>,
}

/// Counts search work and measures time from the first event to the last
#[derive(Debug, Clone, Default)]
pub struct SearchProfiler {
    data: Rc<RefCell<ProfileData>>,
}

impl SearchProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> SearchProfile {
        self.data.borrow().profile
    }

    pub fn reset(&self) {
        *self.data.borrow_mut() = ProfileData::default();
    }
}

impl<V, E> Observer<V, E> for SearchProfiler
where
    V: Copy + 'static,
    E: Copy + 'static,
{
    fn attach(&self, events: &SearchEvents<V, E>) -> Detacher {
        let data = Rc::clone(&self.data);
        Detacher::new(vec![events.subscribe(move |event| {
            let mut data = data.borrow_mut();
            let started = *data.started.get_or_insert_with(Instant::now);
            let profile = &mut data.profile;

            match event.kind() {
                EventKind::DiscoverVertex => profile.vertices_discovered += 1,
                EventKind::ExamineVertex => profile.vertices_examined += 1,
                EventKind::ExamineEdge => profile.edges_examined += 1,
                EventKind::TreeEdge => profile.tree_edges += 1,
                EventKind::EdgeNotRelaxed => profile.edges_not_relaxed += 1,
                _ => {}
            }
            profile.elapsed = started.elapsed();
        })])
    }
}
