//! Solution representation for the route learner.
//!
//! A solution is a closed route over ports together with the reward the route
//! scorer gave it and some provenance about how it was produced.

use crate::instance::{Instance, PortId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Represents a solution to a Dutch Merchant instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The route as a sequence of port indices (starting and ending at the start port)
    pub route: Vec<PortId>,
    /// Reward returned by the route scorer
    pub reward: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of training episodes (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            route: Vec::new(),
            reward: f64::NEG_INFINITY,
            algorithm: String::new(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Create a solution from an already scored route
    pub fn from_route(route: Vec<PortId>, reward: f64, algorithm: &str) -> Self {
        Solution {
            route,
            reward,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Ports visited between the two occurrences of the start port
    pub fn interior(&self) -> &[PortId] {
        if self.route.len() < 2 {
            return &[];
        }
        &self.route[1..self.route.len() - 1]
    }

    /// Check that no interior port is visited twice
    pub fn has_distinct_interior(&self) -> bool {
        let interior = self.interior();
        let unique: HashSet<PortId> = interior.iter().cloned().collect();
        unique.len() == interior.len()
    }

    /// Total travel time including the closing leg
    pub fn total_time(&self, instance: &Instance) -> f64 {
        instance.route_time(&self.route)
    }

    /// Travel time before the closing leg back to the start port
    pub fn outbound_time(&self, instance: &Instance) -> f64 {
        if self.route.len() < 2 {
            return 0.0;
        }
        instance.route_time(&self.route[..self.route.len() - 1])
    }

    /// Whether the whole route, closing leg included, fits in the time budget
    pub fn within_time_limit(&self, instance: &Instance) -> bool {
        self.total_time(instance) <= instance.time_limit
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Reward: {:.4}", self.reward)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Episodes: {}", iter)?;
        }
        writeln!(f, "  Route: {:?}", self.route)
    }
}
