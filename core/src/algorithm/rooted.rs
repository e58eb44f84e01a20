//! Optional root and goal vertices for rooted and search algorithms

use std::fmt::Debug;

use crate::algorithm::events::{Event, Subscription};
use crate::algorithm::traits::{Algorithm, AlgorithmError};

/// Root and goal selection with change notification
#[derive(Debug)]
pub struct SearchRoots<V> {
    root: Option<V>,
    goal: Option<V>,
    root_changed: Event<Option<V>>,
    goal_changed: Event<Option<V>>,
}

impl<V: Copy + PartialEq + 'static> SearchRoots<V> {
    pub fn new() -> Self {
        Self {
            root: None,
            goal: None,
            root_changed: Event::new(),
            goal_changed: Event::new(),
        }
    }

    pub fn root(&self) -> Option<V> {
        self.root
    }

    pub fn goal(&self) -> Option<V> {
        self.goal
    }

    pub fn set_root(&mut self, root: Option<V>) {
        if self.root != root {
            self.root = root;
            self.root_changed.raise(&root);
        }
    }

    pub fn set_goal(&mut self, goal: Option<V>) {
        if self.goal != goal {
            self.goal = goal;
            self.goal_changed.raise(&goal);
        }
    }

    pub fn require_root(&self) -> Result<V, AlgorithmError> {
        self.root.ok_or(AlgorithmError::MissingRootVertex)
    }

    pub fn on_root_changed(&self, handler: impl FnMut(&Option<V>) + 'static) -> Subscription {
        self.root_changed.subscribe(handler)
    }

    pub fn on_goal_changed(&self, handler: impl FnMut(&Option<V>) + 'static) -> Subscription {
        self.goal_changed.subscribe(handler)
    }
}

impl<V: Copy + PartialEq + 'static> Default for SearchRoots<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Algorithms that start from an optional root vertex
pub trait RootedAlgorithm: Algorithm {
    type Root: Copy + PartialEq + Debug + 'static;

    fn roots(&self) -> &SearchRoots<Self::Root>;

    fn roots_mut(&mut self) -> &mut SearchRoots<Self::Root>;

    fn root(&self) -> Option<Self::Root> {
        self.roots().root()
    }

    fn set_root(&mut self, root: Self::Root) {
        self.roots_mut().set_root(Some(root));
    }

    fn clear_root(&mut self) {
        self.roots_mut().set_root(None);
    }

    /// Sets the root and computes
    fn compute_from(&mut self, root: Self::Root) -> Result<(), AlgorithmError> {
        self.set_root(root);
        self.compute()
    }
}

/// Rooted algorithms that may stop early at a goal vertex
pub trait SearchAlgorithm: RootedAlgorithm {
    fn goal(&self) -> Option<Self::Root> {
        self.roots().goal()
    }

    fn set_goal(&mut self, goal: Self::Root) {
        self.roots_mut().set_goal(Some(goal));
    }

    fn clear_goal(&mut self) {
        self.roots_mut().set_goal(None);
    }

    /// Sets root and goal, then computes
    fn compute_between(&mut self, root: Self::Root, goal: Self::Root) -> Result<(), AlgorithmError> {
        self.set_goal(goal);
        self.compute_from(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_root_changes_notify_once() {
        let mut roots = SearchRoots::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = roots.on_root_changed(move |root| sink.borrow_mut().push(*root));

        roots.set_root(Some(1));
        roots.set_root(Some(1));
        roots.set_root(None);

        assert_eq!(*seen.borrow(), vec![Some(1), None]);
        assert_eq!(roots.require_root(), Err(AlgorithmError::MissingRootVertex));
    }

    #[test]
    fn test_goal_is_independent_of_root() {
        let mut roots = SearchRoots::<u32>::new();
        roots.set_goal(Some(4));
        roots.set_root(Some(0));
        assert_eq!(roots.goal(), Some(4));
        assert_eq!(roots.require_root(), Ok(0));
    }
}
