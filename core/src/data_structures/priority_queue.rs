//! Indexed binary heap with decrease-key
//!
//! Elements are dense `usize` keys (typically vertex indices). A reverse
//! position map gives O(1) lookup of an element's heap slot, so priority
//! updates run in O(log n).
//!
//! Entries with equal priority leave the heap in insertion order, which keeps
//! best-first searches deterministic for a fixed graph enumeration order.

use std::cmp::Ordering;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::algorithm::traits::AlgorithmError;

const ABSENT: usize = usize::MAX;

/// Priority comparison trait for type-safe heap operations
pub trait PriorityComparable: Clone + PartialOrd + Debug {
    /// Defines heap order (min-heap vs max-heap)
    fn heap_order() -> HeapOrder;
}

/// Heap ordering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeapOrder {
    Min,
    Max,
}

impl PriorityComparable for f64 {
    fn heap_order() -> HeapOrder {
        HeapOrder::Min
    }
}

impl PriorityComparable for usize {
    fn heap_order() -> HeapOrder {
        HeapOrder::Min
    }
}

#[derive(Debug, Clone)]
struct HeapEntry<P> {
    id: usize,
    priority: P,
    sequence: u64,
}

/// Heap operation result
#[derive(Debug, Clone, PartialEq)]
pub enum HeapOperation<P> {
    Inserted { position: usize },
    Updated { old_priority: P, new_priority: P },
    Removed { id: usize, priority: P },
}

/// Operation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapStats {
    pub insertions: u64,
    pub extractions: u64,
    pub decrease_keys: u64,
    pub comparisons: u64,
}

/// Indexed binary heap implementation
#[derive(Debug, Clone)]
pub struct IndexedPriorityQueue<P: PriorityComparable> {
    heap: Vec<HeapEntry<P>>,
    /// `positions[id]` is the heap slot of `id`, or `ABSENT`
    positions: Vec<usize>,
    order: HeapOrder,
    next_sequence: u64,
    stats: HeapStats,
}

impl<P: PriorityComparable> Default for IndexedPriorityQueue<P> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<P: PriorityComparable> IndexedPriorityQueue<P> {
    /// Creates a queue sized for keys in `0..capacity`; larger keys grow it
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            positions: vec![ABSENT; capacity],
            order: P::heap_order(),
            next_sequence: 0,
            stats: HeapStats::default(),
        }
    }

    /// Inserts `id`, or moves it to `priority` if already queued
    pub fn push(&mut self, id: usize, priority: P) -> HeapOperation<P> {
        if self.contains(id) {
            return self.update_existing(id, priority);
        }

        if id >= self.positions.len() {
            self.positions.resize(id + 1, ABSENT);
        }

        let position = self.heap.len();
        self.heap.push(HeapEntry {
            id,
            priority,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        self.positions[id] = position;
        self.bubble_up(position);
        self.stats.insertions += 1;

        HeapOperation::Inserted { position }
    }

    /// Removes and returns the top element
    pub fn pop(&mut self) -> Option<(usize, P)> {
        if self.heap.is_empty() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.swap_entries(0, last);
        let root = self.heap.pop()?;
        self.positions[root.id] = ABSENT;

        if !self.heap.is_empty() {
            self.bubble_down(0);
        }
        self.stats.extractions += 1;

        Some((root.id, root.priority))
    }

    /// Top element without removing it
    pub fn peek(&self) -> Option<(usize, &P)> {
        self.heap.first().map(|entry| (entry.id, &entry.priority))
    }

    /// Moves an element towards the top. Moving it away is an error.
    pub fn decrease_key(&mut self, id: usize, new_priority: P) -> Result<HeapOperation<P>, AlgorithmError> {
        let position = self.position_of(id).ok_or(AlgorithmError::ElementNotFound(id))?;

        if !self.is_valid_update(&self.heap[position].priority, &new_priority) {
            return Err(AlgorithmError::InvalidPriorityUpdate(id));
        }

        let old_priority = std::mem::replace(&mut self.heap[position].priority, new_priority.clone());
        self.bubble_up(position);
        self.stats.decrease_keys += 1;

        Ok(HeapOperation::Updated {
            old_priority,
            new_priority,
        })
    }

    /// Changes an element's priority in either direction
    pub fn update(&mut self, id: usize, new_priority: P) -> Result<HeapOperation<P>, AlgorithmError> {
        if !self.contains(id) {
            return Err(AlgorithmError::ElementNotFound(id));
        }
        Ok(self.update_existing(id, new_priority))
    }

    /// Removes a specific element
    pub fn remove(&mut self, id: usize) -> Result<HeapOperation<P>, AlgorithmError> {
        let position = self.position_of(id).ok_or(AlgorithmError::ElementNotFound(id))?;

        let last = self.heap.len() - 1;
        self.swap_entries(position, last);
        let removed = self
            .heap
            .pop()
            .ok_or(AlgorithmError::ElementNotFound(id))?;
        self.positions[id] = ABSENT;

        if position < self.heap.len() {
            self.bubble_up(position);
            self.bubble_down(position);
        }

        Ok(HeapOperation::Removed {
            id: removed.id,
            priority: removed.priority,
        })
    }

    pub fn contains(&self, id: usize) -> bool {
        self.position_of(id).is_some()
    }

    /// Current priority of a queued element
    pub fn priority_of(&self, id: usize) -> Option<&P> {
        self.position_of(id).map(|position| &self.heap[position].priority)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        for entry in self.heap.drain(..) {
            self.positions[entry.id] = ABSENT;
        }
    }

    pub fn stats(&self) -> HeapStats {
        self.stats
    }

    /// Checks the heap order and the position map
    pub fn validate(&self) -> Result<(), AlgorithmError> {
        for (position, entry) in self.heap.iter().enumerate() {
            if self.positions.get(entry.id).copied() != Some(position) {
                return Err(AlgorithmError::HeapInvariantViolation(position, position));
            }

            for child in [2 * position + 1, 2 * position + 2] {
                if child < self.heap.len() && self.entry_order(&self.heap[child], entry) == Ordering::Less {
                    return Err(AlgorithmError::HeapInvariantViolation(position, child));
                }
            }
        }
        Ok(())
    }

    fn position_of(&self, id: usize) -> Option<usize> {
        match self.positions.get(id) {
            Some(&position) if position != ABSENT => Some(position),
            _ => None,
        }
    }

    fn update_existing(&mut self, id: usize, new_priority: P) -> HeapOperation<P> {
        let Some(position) = self.position_of(id) else {
            return self.push(id, new_priority);
        };

        let towards_top = self.is_valid_update(&self.heap[position].priority, &new_priority);
        let old_priority = std::mem::replace(&mut self.heap[position].priority, new_priority.clone());
        if towards_top {
            self.bubble_up(position);
            self.stats.decrease_keys += 1;
        } else {
            self.bubble_down(position);
        }

        HeapOperation::Updated {
            old_priority,
            new_priority,
        }
    }

    fn bubble_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if self.compare(position, parent) != Ordering::Less {
                break;
            }
            self.swap_entries(position, parent);
            position = parent;
        }
    }

    fn bubble_down(&mut self, mut position: usize) {
        let len = self.heap.len();

        loop {
            let mut top = position;
            let left = 2 * position + 1;
            let right = 2 * position + 2;

            if left < len && self.compare(left, top) == Ordering::Less {
                top = left;
            }
            if right < len && self.compare(right, top) == Ordering::Less {
                top = right;
            }
            if top == position {
                break;
            }

            self.swap_entries(position, top);
            position = top;
        }
    }

    #[inline]
    fn compare(&mut self, a: usize, b: usize) -> Ordering {
        self.stats.comparisons += 1;
        self.entry_order(&self.heap[a], &self.heap[b])
    }

    /// `Less` means `a` belongs closer to the top than `b`
    fn entry_order(&self, a: &HeapEntry<P>, b: &HeapEntry<P>) -> Ordering {
        let by_priority = match self.order {
            HeapOrder::Min => a.priority.partial_cmp(&b.priority),
            HeapOrder::Max => b.priority.partial_cmp(&a.priority),
        }
        .unwrap_or(Ordering::Equal);

        by_priority.then(a.sequence.cmp(&b.sequence))
    }

    fn swap_entries(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions[self.heap[a].id] = a;
        self.positions[self.heap[b].id] = b;
    }

    fn is_valid_update(&self, old: &P, new: &P) -> bool {
        match self.order {
            HeapOrder::Min => new <= old,
            HeapOrder::Max => new >= old,
        }
    }
}
