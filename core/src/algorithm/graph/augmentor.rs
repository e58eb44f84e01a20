//! Reverse-edge augmentation for flow networks
//!
//! Pairs every edge `u -> v` with a reverse counterpart `v -> u`. An existing
//! unpaired antiparallel edge is reused; otherwise a synthetic edge is added
//! to the graph. Self-loops are their own reverse. The synthetic edges are
//! removed again by [`ReversedEdgeAugmentor::remove_reversed_edges`], or when
//! the augmentor is dropped.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::algorithm::events::{Event, Subscription};
use crate::algorithm::traits::AlgorithmError;
use crate::data_structures::graph::{EdgeListGraph, IncidenceGraph, MutableEdgeGraph};

pub struct ReversedEdgeAugmentor<'g, G>
where
    G: MutableEdgeGraph + IncidenceGraph + EdgeListGraph,
{
    graph: &'g mut G,
    reversed_edges: HashMap<G::Edge, G::Edge>,
    augmented_edges: HashSet<G::Edge>,
    augmented: bool,
    reversed_edge_added: Event<G::Edge>,
}

impl<'g, G> ReversedEdgeAugmentor<'g, G>
where
    G: MutableEdgeGraph + IncidenceGraph + EdgeListGraph,
{
    pub fn new(graph: &'g mut G) -> Self {
        Self {
            graph,
            reversed_edges: HashMap::new(),
            augmented_edges: HashSet::new(),
            augmented: false,
            reversed_edge_added: Event::new(),
        }
    }

    pub fn graph(&self) -> &G {
        &*self.graph
    }

    /// Edge to reverse-edge map, symmetric for every paired edge
    pub fn reversed_edges(&self) -> &HashMap<G::Edge, G::Edge> {
        &self.reversed_edges
    }

    /// Synthetic edges added by the augmentation
    pub fn augmented_edges(&self) -> &HashSet<G::Edge> {
        &self.augmented_edges
    }

    pub fn is_augmented(&self) -> bool {
        self.augmented
    }

    /// Called with every synthetic edge right after it is added
    pub fn on_reversed_edge_added(&self, handler: impl FnMut(&G::Edge) + 'static) -> Subscription {
        self.reversed_edge_added.subscribe(handler)
    }

    /// Adds the missing reverse edges
    ///
    /// Fails with [`AlgorithmError::AlreadyAugmented`] when called twice
    /// without removing the edges in between. A failure while adding leaves
    /// the graph as it was.
    pub fn add_reversed_edges(&mut self) -> Result<(), AlgorithmError> {
        if self.augmented {
            return Err(AlgorithmError::AlreadyAugmented);
        }

        self.augmented = true;
        if let Err(err) = self.pair_edges() {
            self.remove_reversed_edges();
            return Err(err);
        }

        debug!(
            "Augmented {} edges with {} synthetic reverse edges",
            self.reversed_edges.len(),
            self.augmented_edges.len()
        );
        Ok(())
    }

    fn pair_edges(&mut self) -> Result<(), AlgorithmError> {
        let edges: Vec<G::Edge> = self.graph.edges().collect();

        for edge in edges {
            if self.reversed_edges.contains_key(&edge) {
                continue;
            }

            let source = self.graph.source(edge);
            let target = self.graph.target(edge);
            if source == target {
                self.reversed_edges.insert(edge, edge);
                continue;
            }

            let existing = self.graph.out_edges(target).find(|&candidate| {
                self.graph.target(candidate) == source
                    && !self.reversed_edges.contains_key(&candidate)
            });
            let reversed = match existing {
                Some(reversed) => reversed,
                None => {
                    let reversed = self.graph.add_edge(target, source)?;
                    self.augmented_edges.insert(reversed);
                    self.reversed_edge_added.raise(&reversed);
                    reversed
                }
            };

            self.reversed_edges.insert(edge, reversed);
            self.reversed_edges.insert(reversed, edge);
        }
        Ok(())
    }

    /// Removes the synthetic edges and forgets the pairing
    pub fn remove_reversed_edges(&mut self) {
        if !self.augmented {
            return;
        }

        let removed = self.augmented_edges.len();
        for edge in self.augmented_edges.drain() {
            self.graph.remove_edge(edge);
        }
        self.reversed_edges.clear();
        self.augmented = false;
        debug!("Removed {removed} synthetic reverse edges");
    }
}

impl<'g, G> Drop for ReversedEdgeAugmentor<'g, G>
where
    G: MutableEdgeGraph + IncidenceGraph + EdgeListGraph,
{
    fn drop(&mut self) {
        self.remove_reversed_edges();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::graph::{AdjacencyGraph, EdgeId, GraphBase};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_adds_synthetic_reverse_edges() {
        let mut graph = AdjacencyGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let added = Rc::new(RefCell::new(Vec::new()));
        let mut augmentor = ReversedEdgeAugmentor::new(&mut graph);
        let sink = Rc::clone(&added);
        let _s = augmentor.on_reversed_edge_added(move |edge| sink.borrow_mut().push(*edge));

        augmentor.add_reversed_edges().unwrap();

        assert!(augmentor.is_augmented());
        assert_eq!(augmentor.augmented_edges().len(), 2);
        assert_eq!(augmentor.graph().edge_count(), 4);
        let reversed = augmentor.reversed_edges()[&EdgeId(0)];
        assert_eq!(augmentor.graph().source(reversed).0, 1);
        assert_eq!(augmentor.graph().target(reversed).0, 0);
        assert_eq!(augmentor.reversed_edges()[&reversed], EdgeId(0));
        assert_eq!(added.borrow().len(), 2);
    }

    #[test]
    fn test_reuses_antiparallel_edges_and_self_loops() {
        let mut graph = AdjacencyGraph::from_edges(2, &[(0, 1), (1, 0), (0, 1), (1, 1)]).unwrap();
        let mut augmentor = ReversedEdgeAugmentor::new(&mut graph);

        augmentor.add_reversed_edges().unwrap();

        let reversed = augmentor.reversed_edges();
        assert_eq!(reversed[&EdgeId(0)], EdgeId(1));
        assert_eq!(reversed[&EdgeId(1)], EdgeId(0));
        assert_eq!(reversed[&EdgeId(3)], EdgeId(3));
        // The second parallel edge has no free partner left.
        assert!(augmentor.augmented_edges().contains(&reversed[&EdgeId(2)]));
        assert_eq!(augmentor.augmented_edges().len(), 1);
    }

    #[test]
    fn test_second_augmentation_is_rejected() {
        let mut graph = AdjacencyGraph::from_edges(2, &[(0, 1)]).unwrap();
        let mut augmentor = ReversedEdgeAugmentor::new(&mut graph);

        augmentor.add_reversed_edges().unwrap();
        assert_eq!(augmentor.add_reversed_edges(), Err(AlgorithmError::AlreadyAugmented));

        augmentor.remove_reversed_edges();
        assert!(augmentor.add_reversed_edges().is_ok());
    }

    #[test]
    fn test_drop_rolls_back() {
        let mut graph = AdjacencyGraph::from_edges(3, &[(0, 1), (1, 2), (2, 0)]).unwrap();
        {
            let mut augmentor = ReversedEdgeAugmentor::new(&mut graph);
            augmentor.add_reversed_edges().unwrap();
            assert_eq!(augmentor.graph().edge_count(), 6);
        }
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.contains_edge_id(EdgeId(2)));
    }
}
