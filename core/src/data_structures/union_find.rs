//! Disjoint-set forest with path compression and union by rank

use std::cmp::Ordering;

/// Union-Find over dense indices `0..len`
#[derive(Debug, Clone, Default)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
    components: usize,
}

impl UnionFind {
    /// Creates `n` singleton sets
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            components: n,
        }
    }

    /// Adds a new singleton set and returns its element
    pub fn make_set(&mut self) -> usize {
        let element = self.parent.len();
        self.parent.push(element);
        self.rank.push(0);
        self.components += 1;
        element
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `x`
    ///
    /// Every element visited on the way up is re-pointed at the root.
    pub fn find_set(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merges the sets of `x` and `y`. Returns `false` if they were already joined.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find_set(x);
        let root_y = self.find_set(y);

        if root_x == root_y {
            return false;
        }

        match self.rank[root_x].cmp(&self.rank[root_y]) {
            Ordering::Less => self.parent[root_x] = root_y,
            Ordering::Greater => self.parent[root_y] = root_x,
            Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }

        self.components -= 1;
        true
    }

    pub fn connected(&mut self, x: usize, y: usize) -> bool {
        self.find_set(x) == self.find_set(y)
    }

    /// Number of disjoint sets
    pub fn components(&self) -> usize {
        self.components
    }
}
