//! Bounded Series
//!
//! Per-equipment sliding window over insertion order. Once the window is
//! full, every append evicts the earliest-inserted reading regardless of
//! its timestamp.

use std::collections::VecDeque;

use crate::domain::Reading;

/// Insertion-ordered, capacity-bounded sequence of readings.
#[derive(Debug, Clone)]
pub struct Series {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl Series {
    /// Create an empty series holding at most `capacity` readings.
    ///
    /// A zero capacity is clamped to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a reading, returning the evicted reading if the window was full.
    pub fn push(&mut self, reading: Reading) -> Option<Reading> {
        self.readings.push_back(reading);
        if self.readings.len() > self.capacity {
            self.readings.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy the contents out in insertion order.
    pub fn to_vec(&self) -> Vec<Reading> {
        self.readings.iter().cloned().collect()
    }

    /// The earliest-inserted reading carrying the maximum timestamp.
    pub fn latest(&self) -> Option<&Reading> {
        let mut iter = self.readings.iter();
        let mut best = iter.next()?;
        for r in iter {
            if r.timestamp > best.timestamp {
                best = r;
            }
        }
        Some(best)
    }
}

// =============================================================================
// Tests
// =============================================================================
