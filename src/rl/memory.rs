//! Bounded store of the best routes seen during training.

use crate::instance::PortId;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

#[derive(Debug, Clone, PartialEq)]
pub struct EliteEntry {
    pub reward: f64,
    pub route: Vec<PortId>,
}

/// Top-K routes by reward, kept sorted best first with no duplicate routes.
#[derive(Debug, Clone)]
pub struct EliteMemory {
    capacity: usize,
    entries: Vec<EliteEntry>,
}

impl EliteMemory {
    pub fn new(capacity: usize) -> Self {
        EliteMemory {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Offer a route to the memory. Returns true when it was stored.
    ///
    /// A route already present is ignored. When the memory is full the new
    /// route replaces the worst one only if its reward is strictly higher.
    pub fn insert(&mut self, reward: f64, route: &[PortId]) -> bool {
        if self.capacity == 0 || reward.is_nan() {
            return false;
        }
        if self.entries.iter().any(|entry| entry.route == route) {
            return false;
        }

        if self.entries.len() >= self.capacity {
            match self.entries.last() {
                Some(worst) if reward > worst.reward => {
                    self.entries.pop();
                }
                _ => return false,
            }
        }

        self.entries.push(EliteEntry {
            reward,
            route: route.to_vec(),
        });
        self.entries
            .sort_by_key(|entry| Reverse(OrderedFloat(entry.reward)));
        true
    }

    /// Entries, best first
    pub fn entries(&self) -> &[EliteEntry] {
        &self.entries
    }

    pub fn best(&self) -> Option<&EliteEntry> {
        self.entries.first()
    }

    pub fn worst(&self) -> Option<&EliteEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
