//! Event channels and the search event vocabulary
//!
//! An [`Event`] is a single-threaded multicast channel: handlers subscribe and
//! receive a [`Subscription`] guard that unsubscribes when dropped. Algorithms
//! raise events synchronously, in line with their own control flow.
//! [`SharedEvent`] is the thread-safe flavour used by lifecycle and
//! cancellation notifications, which may fire from an aborting thread.
//!
//! Handlers may subscribe or unsubscribe (including themselves) while an
//! event is being raised. Handlers added during a raise are first called on
//! the next raise.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

struct Listeners<H> {
    next_id: u64,
    slots: Vec<(u64, Option<H>)>,
}

impl<H> Listeners<H> {
    fn new() -> Self {
        Self {
            next_id: 0,
            slots: Vec::new(),
        }
    }

    fn add(&mut self, handler: H) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.slots.push((id, Some(handler)));
        id
    }

    fn remove(&mut self, id: u64) {
        self.slots.retain(|(slot, _)| *slot != id);
    }

    fn ids(&self) -> Vec<u64> {
        self.slots.iter().map(|(id, _)| *id).collect()
    }

    /// Takes a handler out for the duration of a call
    fn take(&mut self, id: u64) -> Option<H> {
        self.slots
            .iter_mut()
            .find(|(slot, _)| *slot == id)
            .and_then(|(_, handler)| handler.take())
    }

    /// Puts a handler back unless it was unsubscribed meanwhile
    fn restore(&mut self, id: u64, handler: H) {
        if let Some((_, slot)) = self.slots.iter_mut().find(|(slot, _)| *slot == id) {
            *slot = Some(handler);
        }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Scoped event subscription
///
/// Dropping the guard detaches the handler. Use [`Subscription::forget`] to
/// keep the handler attached for the lifetime of the event.
#[must_use = "dropping a subscription detaches its handler immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detaches now
    pub fn detach(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }

    /// Keeps the handler attached permanently
    pub fn forget(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

type Handler<T> = Box<dyn FnMut(&T)>;

/// Single-threaded multicast event
pub struct Event<T> {
    listeners: Rc<RefCell<Listeners<Handler<T>>>>,
}

impl<T: 'static> Event<T> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Listeners::new())),
        }
    }

    pub fn subscribe(&self, handler: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.listeners.borrow_mut().add(Box::new(handler));
        let weak = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.borrow_mut().remove(id);
            }
        })
    }

    /// Calls every handler in subscription order
    pub fn raise(&self, args: &T) {
        let ids = self.listeners.borrow().ids();
        for id in ids {
            let taken = self.listeners.borrow_mut().take(id);
            if let Some(mut handler) = taken {
                handler(args);
                self.listeners.borrow_mut().restore(id, handler);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn has_listeners(&self) -> bool {
        self.listener_count() > 0
    }
}

impl<T: 'static> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.listeners.try_borrow().map(|l| l.len()).unwrap_or(0);
        f.debug_struct("Event").field("listeners", &count).finish()
    }
}

type SharedHandler<T> = Box<dyn FnMut(&T) + Send>;

/// Thread-safe multicast event
pub struct SharedEvent<T> {
    listeners: Arc<Mutex<Listeners<SharedHandler<T>>>>,
}

impl<T: 'static> SharedEvent<T> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Listeners::new())),
        }
    }

    pub fn subscribe(&self, handler: impl FnMut(&T) + Send + 'static) -> Subscription {
        let id = lock(&self.listeners).add(Box::new(handler));
        let weak = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                lock(&listeners).remove(id);
            }
        })
    }

    /// Calls every handler in subscription order, without holding the lock
    pub fn raise(&self, args: &T) {
        let ids = lock(&self.listeners).ids();
        for id in ids {
            let taken = lock(&self.listeners).take(id);
            if let Some(mut handler) = taken {
                handler(args);
                lock(&self.listeners).restore(id, handler);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

impl<T: 'static> Default for SharedEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SharedEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEvent").finish_non_exhaustive()
    }
}

fn lock<H>(listeners: &Mutex<Listeners<H>>) -> MutexGuard<'_, Listeners<H>> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Edge payload of search events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeArgs<V, E> {
    pub edge: E,
    pub source: V,
    pub target: V,
}

/// Discriminant of [`SearchEvent`], for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    InitializeVertex,
    StartVertex,
    DiscoverVertex,
    ExamineVertex,
    FinishVertex,
    TargetReached,
    ExamineEdge,
    TreeEdge,
    NonTreeEdge,
    GrayTarget,
    BlackTarget,
    BackEdge,
    ForwardOrCrossEdge,
    EdgeNotRelaxed,
    EdgeMinimized,
    EdgeNotMinimized,
}

/// Everything a traversal or relaxation algorithm reports while running
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchEvent<V, E> {
    InitializeVertex(V),
    StartVertex(V),
    DiscoverVertex(V),
    ExamineVertex(V),
    FinishVertex(V),
    /// The goal vertex was finished and the search stopped
    TargetReached(V),
    ExamineEdge(EdgeArgs<V, E>),
    TreeEdge(EdgeArgs<V, E>),
    NonTreeEdge(EdgeArgs<V, E>),
    GrayTarget(EdgeArgs<V, E>),
    BlackTarget(EdgeArgs<V, E>),
    BackEdge(EdgeArgs<V, E>),
    ForwardOrCrossEdge(EdgeArgs<V, E>),
    EdgeNotRelaxed(EdgeArgs<V, E>),
    /// Bellman-Ford verification: edge cannot be improved further
    EdgeMinimized(EdgeArgs<V, E>),
    /// Bellman-Ford verification: edge still improvable, negative cycle
    EdgeNotMinimized(EdgeArgs<V, E>),
}

impl<V: Copy, E: Copy> SearchEvent<V, E> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::InitializeVertex(_) => EventKind::InitializeVertex,
            Self::StartVertex(_) => EventKind::StartVertex,
            Self::DiscoverVertex(_) => EventKind::DiscoverVertex,
            Self::ExamineVertex(_) => EventKind::ExamineVertex,
            Self::FinishVertex(_) => EventKind::FinishVertex,
            Self::TargetReached(_) => EventKind::TargetReached,
            Self::ExamineEdge(_) => EventKind::ExamineEdge,
            Self::TreeEdge(_) => EventKind::TreeEdge,
            Self::NonTreeEdge(_) => EventKind::NonTreeEdge,
            Self::GrayTarget(_) => EventKind::GrayTarget,
            Self::BlackTarget(_) => EventKind::BlackTarget,
            Self::BackEdge(_) => EventKind::BackEdge,
            Self::ForwardOrCrossEdge(_) => EventKind::ForwardOrCrossEdge,
            Self::EdgeNotRelaxed(_) => EventKind::EdgeNotRelaxed,
            Self::EdgeMinimized(_) => EventKind::EdgeMinimized,
            Self::EdgeNotMinimized(_) => EventKind::EdgeNotMinimized,
        }
    }

    /// The vertex of a vertex event
    pub fn vertex(&self) -> Option<V> {
        match *self {
            Self::InitializeVertex(v)
            | Self::StartVertex(v)
            | Self::DiscoverVertex(v)
            | Self::ExamineVertex(v)
            | Self::FinishVertex(v)
            | Self::TargetReached(v) => Some(v),
            _ => None,
        }
    }

    /// The payload of an edge event
    pub fn edge(&self) -> Option<EdgeArgs<V, E>> {
        match *self {
            Self::ExamineEdge(args)
            | Self::TreeEdge(args)
            | Self::NonTreeEdge(args)
            | Self::GrayTarget(args)
            | Self::BlackTarget(args)
            | Self::BackEdge(args)
            | Self::ForwardOrCrossEdge(args)
            | Self::EdgeNotRelaxed(args)
            | Self::EdgeMinimized(args)
            | Self::EdgeNotMinimized(args) => Some(args),
            _ => None,
        }
    }
}

/// Event channel carried by every observable algorithm
pub type SearchEvents<V, E> = Event<SearchEvent<V, E>>;
