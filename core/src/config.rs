//! Algorithm parameters
//!
//! [`AlgorithmConfig`] gathers the tunables of every algorithm in one
//! serde-friendly struct. [`AlgorithmConfig::apply_to`] pushes the values
//! through [`Algorithm::set_parameter`]; each algorithm picks the names it
//! knows and the rest are skipped.

use serde::{Deserialize, Serialize};

use crate::algorithm::path_finding::StandardRelaxer;
use crate::algorithm::traits::{Algorithm, AlgorithmError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlgorithmConfig {
    /// Distance relaxer for the shortest path algorithms
    pub relaxer: StandardRelaxer,
    /// Bellman-Ford stops after a pass that relaxed nothing
    pub early_exit: bool,
    /// A* re-opens finished vertices whose distance improves
    pub reopen_closed: bool,
    /// Residual capacities at or below this value count as saturated
    pub flow_epsilon: f64,
    /// Upper bound on Edmonds-Karp augmentations, unbounded when `None`
    pub max_augmentations: Option<usize>,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            relaxer: StandardRelaxer::default(),
            early_exit: true,
            reopen_closed: true,
            flow_epsilon: 0.0,
            max_augmentations: None,
        }
    }
}

impl AlgorithmConfig {
    pub fn from_json(json: &str) -> Result<Self, AlgorithmError> {
        serde_json::from_str(json)
            .map_err(|err| AlgorithmError::invalid_parameter("config", err.to_string()))
    }

    pub fn to_json(&self) -> Result<String, AlgorithmError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| AlgorithmError::invalid_parameter("config", err.to_string()))
    }

    /// Parameters as `(name, value)` pairs in `set_parameter` form
    pub fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("relaxer", self.relaxer.as_str().to_owned()),
            ("early_exit", self.early_exit.to_string()),
            ("reopen_closed", self.reopen_closed.to_string()),
            ("flow_epsilon", self.flow_epsilon.to_string()),
            (
                "max_augmentations",
                self.max_augmentations
                    .map_or_else(|| "none".to_owned(), |limit| limit.to_string()),
            ),
        ]
    }

    /// Applies every parameter `algorithm` understands
    ///
    /// Returns how many were applied. Unknown names are skipped; invalid
    /// values fail.
    pub fn apply_to(&self, algorithm: &mut dyn Algorithm) -> Result<usize, AlgorithmError> {
        let mut applied = 0;
        for (name, value) in self.parameters() {
            match algorithm.set_parameter(name, &value) {
                Ok(()) => applied += 1,
                Err(AlgorithmError::UnknownParameter(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::graph::EdmondsKarpMaximumFlow;
    use crate::algorithm::path_finding::{BellmanFordShortestPath, DijkstraShortestPath};
    use crate::data_structures::graph::AdjacencyGraph;
    use std::collections::HashMap;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = AlgorithmConfig::from_json(r#"{ "relaxer": "critical" }"#).unwrap();

        assert_eq!(config.relaxer, StandardRelaxer::Critical);
        assert!(config.early_exit);
        assert_eq!(config.max_augmentations, None);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = AlgorithmConfig::from_json(r#"{ "heuristic": "manhattan" }"#);
        assert!(matches!(
            result,
            Err(AlgorithmError::InvalidParameter { ref name, .. }) if name == "config"
        ));
    }

    #[test]
    fn test_apply_skips_foreign_parameters() {
        let graph = AdjacencyGraph::with_vertices(2);
        let config = AlgorithmConfig {
            relaxer: StandardRelaxer::EdgeExtract,
            early_exit: false,
            ..AlgorithmConfig::default()
        };

        let mut dijkstra = DijkstraShortestPath::new(&graph, |_| 1.0);
        assert_eq!(config.apply_to(&mut dijkstra).unwrap(), 1);
        assert_eq!(dijkstra.get_parameter("relaxer").as_deref(), Some("edge-extract"));

        let mut bellman_ford = BellmanFordShortestPath::new(&graph, |_| 1.0);
        assert_eq!(config.apply_to(&mut bellman_ford).unwrap(), 2);
        assert_eq!(bellman_ford.get_parameter("early_exit").as_deref(), Some("false"));
    }

    #[test]
    fn test_invalid_value_fails() {
        let graph = AdjacencyGraph::with_vertices(2);
        let reversed = HashMap::new();
        let mut flow = EdmondsKarpMaximumFlow::new(&graph, |_| 1.0, &reversed);
        let config = AlgorithmConfig {
            flow_epsilon: -0.5,
            ..AlgorithmConfig::default()
        };

        assert!(config.apply_to(&mut flow).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = AlgorithmConfig {
            max_augmentations: Some(8),
            ..AlgorithmConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(AlgorithmConfig::from_json(&json).unwrap(), config);
    }
}
