//! Distance relaxers
//!
//! A relaxer decides what "better" means for a distance (`compare`) and how a
//! distance grows along an edge (`combine`). Every shortest-path algorithm in
//! this crate relaxes edges through one, so the same code computes shortest
//! paths, critical (longest) paths in DAGs, or Prim-style edge extraction.
//!
//! # Relaxation
//! `relax(e)`: `candidate = combine(d[source], w(e))`; if
//! `compare(candidate, d[target]) == Less` then `d[target] = candidate` and
//! the edge becomes a tree edge.

use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::algorithm::traits::AlgorithmError;

pub trait DistanceRelaxer: Debug {
    fn name(&self) -> &'static str;

    /// Distance of every vertex before the search reaches it
    fn initial_distance(&self) -> f64;

    /// Distance assigned to a search root
    fn source_distance(&self) -> f64 {
        0.0
    }

    /// `Less` when `a` is strictly better than `b`
    fn compare(&self, a: f64, b: f64) -> Ordering;

    fn combine(&self, distance: f64, weight: f64) -> f64;

    /// Min-queue key for a distance
    fn queue_key(&self, distance: f64) -> f64 {
        distance
    }
}

/// Ordinary shortest distances: `+`, `<`, starting at `+inf`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShortestDistanceRelaxer;

impl DistanceRelaxer for ShortestDistanceRelaxer {
    fn name(&self) -> &'static str {
        "shortest"
    }

    fn initial_distance(&self) -> f64 {
        f64::INFINITY
    }

    fn compare(&self, a: f64, b: f64) -> Ordering {
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    }

    fn combine(&self, distance: f64, weight: f64) -> f64 {
        distance + weight
    }
}

/// Longest distances: `+`, `>`, starting at `-inf`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CriticalDistanceRelaxer;

impl DistanceRelaxer for CriticalDistanceRelaxer {
    fn name(&self) -> &'static str {
        "critical"
    }

    fn initial_distance(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn compare(&self, a: f64, b: f64) -> Ordering {
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    }

    fn combine(&self, distance: f64, weight: f64) -> f64 {
        distance + weight
    }

    fn queue_key(&self, distance: f64) -> f64 {
        -distance
    }
}

/// Keeps the raw weight of the best incoming edge instead of accumulating
///
/// Dijkstra driven by this relaxer over a symmetric graph is Prim's
/// algorithm: tree edges form a minimum spanning tree of the root's
/// component and each distance is the weight of the edge that attached the
/// vertex. An unreached source relaxes nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeExtractDistanceRelaxer;

impl DistanceRelaxer for EdgeExtractDistanceRelaxer {
    fn name(&self) -> &'static str {
        "edge-extract"
    }

    fn initial_distance(&self) -> f64 {
        f64::INFINITY
    }

    fn compare(&self, a: f64, b: f64) -> Ordering {
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    }

    fn combine(&self, distance: f64, weight: f64) -> f64 {
        if distance == self.initial_distance() {
            distance
        } else {
            weight
        }
    }
}

/// Named relaxers selectable through configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StandardRelaxer {
    #[default]
    Shortest,
    Critical,
    EdgeExtract,
}

impl StandardRelaxer {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shortest => "shortest",
            Self::Critical => "critical",
            Self::EdgeExtract => "edge-extract",
        }
    }

    pub fn build(self) -> std::rc::Rc<dyn DistanceRelaxer> {
        match self {
            Self::Shortest => std::rc::Rc::new(ShortestDistanceRelaxer),
            Self::Critical => std::rc::Rc::new(CriticalDistanceRelaxer),
            Self::EdgeExtract => std::rc::Rc::new(EdgeExtractDistanceRelaxer),
        }
    }
}

impl fmt::Display for StandardRelaxer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StandardRelaxer {
    type Err = AlgorithmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "shortest" => Ok(Self::Shortest),
            "critical" => Ok(Self::Critical),
            "edge-extract" => Ok(Self::EdgeExtract),
            other => Err(AlgorithmError::invalid_parameter(
                "relaxer",
                format!("unknown relaxer '{other}'"),
            )),
        }
    }
}

/// Relaxes the edge `source -> target` of weight `weight`
///
/// Returns `true` and updates `distances[target]` when the candidate distance
/// is strictly better. Ties keep the existing distance, so the first edge
/// examined wins.
#[inline]
pub fn relax(
    relaxer: &dyn DistanceRelaxer,
    distances: &mut [f64],
    source: usize,
    target: usize,
    weight: f64,
) -> bool {
    let candidate = relaxer.combine(distances[source], weight);
    if relaxer.compare(candidate, distances[target]) == Ordering::Less {
        distances[target] = candidate;
        true
    } else {
        false
    }
}

/// Checks whether an edge could still be relaxed, without updating
#[inline]
pub fn can_relax(
    relaxer: &dyn DistanceRelaxer,
    distances: &[f64],
    source: usize,
    target: usize,
    weight: f64,
) -> bool {
    let candidate = relaxer.combine(distances[source], weight);
    relaxer.compare(candidate, distances[target]) == Ordering::Less
}
