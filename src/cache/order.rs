//! Insertion Order Module
//!
//! Tracks the order in which keys were first written, for FIFO eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks first-insertion order of keys.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest insertion
/// - Back = Newest insertion
///
/// The tracker does not check for duplicates: callers push a key only when
/// their own map reports it as new. Reads never reorder keys.
#[derive(Debug, Default, Clone)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Records a newly inserted key as the newest one.
    pub fn push_newest(&mut self, key: impl Into<String>) {
        self.order.push_back(key.into());
    }

    // == Pop ==
    /// Removes and returns the earliest-inserted key.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Remove ==
    /// Removes an arbitrary key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    // == Oldest ==
    /// Returns the earliest-inserted key still present.
    pub fn oldest(&self) -> Option<&String> {
        self.order.front()
    }

    /// Keys from oldest to newest.
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
